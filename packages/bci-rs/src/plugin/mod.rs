//! Signal-processing box interface.
//!
//! A processing host (OpenViBE-style) calls a box in a fixed lifecycle:
//! [`ProcessingBox::initialize`] once, [`ProcessingBox::process`] for every
//! block of queued input, [`ProcessingBox::uninitialize`] once. Input arrives
//! as [`MatrixChunk`]s, decoded once at the host boundary.

pub mod difference;

pub use difference::{control_value, ControlValue, DifferenceBox};

use crate::error::Result;
use std::collections::VecDeque;

/// One item of a streamed-matrix input queue
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixChunk {
    /// Matrix shape announced before any data
    Header { dimension_sizes: Vec<usize> },
    /// One data block, flattened
    Buffer(Vec<f64>),
    /// Producer finished
    End,
}

pub trait ProcessingBox {
    fn initialize(&mut self) -> Result<()>;

    /// Consume every chunk currently queued on the input.
    fn process(&mut self, input: &mut VecDeque<MatrixChunk>) -> Result<()>;

    fn uninitialize(&mut self) -> Result<()>;
}
