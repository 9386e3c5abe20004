//! ONNX Runtime session wrapper.

use std::path::Path;

use ort::session::{builder::GraphOptimizationLevel, Session};

use crate::detection::engine::InferenceBackend;
use crate::error::{DrishtiError, Result};

/// Model runtime backed by ONNX Runtime, CPU execution.
#[derive(Debug)]
pub struct OnnxBackend {
    session: Session,
    input_name: String,
    output_count: usize,
}

impl OnnxBackend {
    /// Load a model file and prepare a session for repeated inference.
    pub fn load(path: &Path, input_name: String) -> Result<Self> {
        let session = Session::builder()
            .and_then(|b| Ok(b.with_optimization_level(GraphOptimizationLevel::Level3)?))
            .and_then(|b| Ok(b.with_intra_threads(4)?))
            .and_then(|mut b| b.commit_from_file(path))
            .map_err(|e| {
                DrishtiError::ModelLoad(format!("cannot load model {}: {e}", path.display()))
            })?;

        let output_count = session.outputs().len();
        Ok(Self {
            session,
            input_name,
            output_count,
        })
    }
}

impl InferenceBackend for OnnxBackend {
    fn run(&mut self, input: &[f32], shape: [usize; 4]) -> Result<Vec<Vec<f32>>> {
        let value =
            ort::value::Value::from_array((shape.as_slice(), input.to_vec().into_boxed_slice()))
                .map_err(|e| {
                    DrishtiError::Inference(format!("cannot build input tensor: {e}"))
                })?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => value])
            .map_err(|e| DrishtiError::Inference(format!("model run failed: {e}")))?;

        let mut layers = Vec::with_capacity(self.output_count);
        for i in 0..self.output_count {
            let (_, data) = outputs[i].try_extract_tensor::<f32>().map_err(|e| {
                DrishtiError::Inference(format!("cannot read output tensor {i}: {e}"))
            })?;
            layers.push(data.to_vec());
        }
        Ok(layers)
    }
}
