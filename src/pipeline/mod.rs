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

//! Ordered step runner
//!
//! A [`Pipeline`] threads one context value through a fixed list of steps.
//! The first failing step aborts the run; its error is returned unchanged.

use std::fmt;

/// Context that can receive progress lines from the runner
pub trait StepContext {
    /// Append a diagnostic line
    fn record(&mut self, message: String);
}

/// One step of a pipeline
pub trait PipelineStep<C, E>: Send + Sync {
    /// Name used in progress lines
    fn name(&self) -> &'static str;

    /// Transform the context
    fn execute(&self, context: C) -> Result<C, E>;
}

/// Statically assembled list of steps
pub struct Pipeline<C, E> {
    steps: Vec<Box<dyn PipelineStep<C, E>>>,
}

impl<C, E> Pipeline<C, E> {
    /// Start assembling a pipeline
    pub fn builder() -> PipelineBuilder<C, E> {
        PipelineBuilder::new()
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the pipeline has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in execution order
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }
}

impl<C: StepContext, E> Pipeline<C, E> {
    /// Run every step in order
    pub fn run(&self, mut context: C) -> Result<C, E> {
        for step in &self.steps {
            let name = step.name();
            log::debug!("Running pipeline step {name}");
            context.record(format!("Started {name}"));
            context = step.execute(context)?;
            context.record(format!("Finished {name}"));
        }
        Ok(context)
    }
}

impl<C, E> fmt::Debug for Pipeline<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.step_names())
            .finish()
    }
}

/// Builder for [`Pipeline`]
pub struct PipelineBuilder<C, E> {
    steps: Vec<Box<dyn PipelineStep<C, E>>>,
}

impl<C, E> PipelineBuilder<C, E> {
    /// Empty builder
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step
    pub fn step(mut self, step: impl PipelineStep<C, E> + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Finish assembling
    pub fn build(self) -> Pipeline<C, E> {
        Pipeline { steps: self.steps }
    }
}

impl<C, E> Default for PipelineBuilder<C, E> {
    fn default() -> Self {
        Self::new()
    }
}
