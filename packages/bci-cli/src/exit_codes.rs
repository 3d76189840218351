use bci_rs::BciError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const STREAM_NOT_FOUND: i32 = 2;
pub const INPUT_ERROR: i32 = 3;
pub const STREAM_ERROR: i32 = 4;
pub const RENDER_ERROR: i32 = 5;

/// Process exit code for a library error.
pub fn for_error(error: &BciError) -> i32 {
    match error {
        BciError::StreamNotFound { .. } => STREAM_NOT_FOUND,
        BciError::InvalidConfig(_) | BciError::BackendUnavailable(_) | BciError::Parse(_) => {
            INPUT_ERROR
        }
        BciError::StreamLost(_)
        | BciError::Connection(_)
        | BciError::Io(_)
        | BciError::ChannelMismatch { .. } => STREAM_ERROR,
        BciError::Render(_) => RENDER_ERROR,
        BciError::Plugin(_) => FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let not_found = BciError::StreamNotFound {
            name: "BCI_Control_Signal".into(),
        };
        assert_eq!(for_error(&not_found), STREAM_NOT_FOUND);
        assert_eq!(
            for_error(&BciError::InvalidConfig("bad".into())),
            INPUT_ERROR
        );
        assert_eq!(
            for_error(&BciError::BackendUnavailable("lsl".into())),
            INPUT_ERROR
        );
        assert_eq!(for_error(&BciError::StreamLost("gone".into())), STREAM_ERROR);
        assert_eq!(for_error(&BciError::Render("window".into())), RENDER_ERROR);
    }
}
