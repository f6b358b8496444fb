// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Template-to-instance mapping
//!
//! A template is a submodel whose elements carry mapping qualifiers:
//!
//! - `SMT/MappingInfo` holds a path into the source data whose value is
//!   written into the element
//! - `SMT/CollectionMappingInfo` repeats a collection element once per entry
//!   of a source array
//! - `SMT/Cardinality` starting with `One` makes the sibling mapping mandatory
//!
//! [`SubmodelMapper::map`] runs the passes in [`steps`] over a copy of the
//! template and returns the populated instance.

pub mod context;
pub mod element;
pub mod error;
pub mod mapper;
pub mod qualifier;
pub mod steps;

pub use context::MappingContext;
pub use element::ModelType;
pub use error::{MappingError, MappingErrorKind, MappingResult};
pub use mapper::{SubmodelMapper, map_template_to_instance};
pub use qualifier::{Cardinality, Qualifier, QualifierType};
