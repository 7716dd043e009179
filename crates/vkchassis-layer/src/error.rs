use ash::vk;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayerError {
    #[error("loader link info missing from {0} create chain")]
    MissingLinkInfo(&'static str),

    #[error("next layer does not expose {0}")]
    MissingEntryPoint(&'static str),

    #[error("no dispatch context for {0}")]
    UnknownDispatchable(&'static str),
}

impl From<LayerError> for vk::Result {
    fn from(err: LayerError) -> Self {
        match err {
            LayerError::UnknownDispatchable(_) => vk::Result::ERROR_DEVICE_LOST,
            LayerError::MissingLinkInfo(_) | LayerError::MissingEntryPoint(_) => {
                vk::Result::ERROR_INITIALIZATION_FAILED
            }
        }
    }
}
