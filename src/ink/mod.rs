pub mod gesture;
pub mod recognize;

pub use gesture::{GesturePhase, GestureRecorder, Stroke, StrokeSample};
pub use recognize::{HttpRecognitionTransport, InkRecognizer, RecognitionTransport};
