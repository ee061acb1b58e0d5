//! Process exit codes and messages for errors

use notion_api::{error::ApiErrorCode, prelude::NotionError};

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_UNAUTHORIZED: i32 = 2;
pub const EXIT_NOT_FOUND: i32 = 3;
pub const EXIT_TIMEOUT: i32 = 4;
pub const EXIT_RATE_LIMITED: i32 = 5;
pub const EXIT_VALIDATION: i32 = 6;

fn notion_error(err: &anyhow::Error) -> Option<&NotionError> {
    err.chain().find_map(|cause| cause.downcast_ref::<NotionError>())
}

/// Exit code for the process, based on the first `NotionError` in the chain
pub fn exit_code(err: &anyhow::Error) -> i32 {
    let Some(err) = notion_error(err) else {
        return EXIT_FAILURE;
    };
    match err {
        NotionError::RequestTimeout { .. } => EXIT_TIMEOUT,
        NotionError::Validation { .. } => EXIT_VALIDATION,
        e if e.is_unauthorized() => EXIT_UNAUTHORIZED,
        e if e.is_not_found() => EXIT_NOT_FOUND,
        e if e.is_rate_limited() => EXIT_RATE_LIMITED,
        NotionError::Api {
            code: ApiErrorCode::ValidationError | ApiErrorCode::InvalidRequest,
            ..
        } => EXIT_VALIDATION,
        _ => EXIT_FAILURE,
    }
}

/// One-line message for the user
pub fn describe(err: &anyhow::Error) -> String {
    let Some(notion) = notion_error(err) else {
        return format!("error: {err:#}");
    };
    let hint = match notion {
        NotionError::RequestTimeout { .. } => "request timed out",
        NotionError::Config { .. } => "configuration",
        e if e.is_unauthorized() => {
            "unauthorized: check NOTION_TOKEN and that the integration has access"
        }
        e if e.is_not_found() => {
            "not found: check the id and that it is shared with the integration"
        }
        e if e.is_rate_limited() => "rate limited",
        _ => "error",
    };
    format!("{hint}: {err:#}")
}
