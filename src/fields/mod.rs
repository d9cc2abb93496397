//! Canonical envelope field names and the status-code / reason-phrase table.

use std::fmt::{self, Display};

/// Keys of the normalized response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiField {
    Status,
    Code,
    Reason,
    Message,
    ResponseBody,
    Headers,
}

impl ApiField {
    pub const fn as_str(self) -> &'static str {
        match self {
            ApiField::Status => "status",
            ApiField::Code => "code",
            ApiField::Reason => "reason",
            ApiField::Message => "message",
            ApiField::ResponseBody => "responseBody",
            ApiField::Headers => "headers",
        }
    }
}

impl Display for ApiField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key used to wrap a body that is not JSON.
pub const RESPONSE_BODY_NON_JSON: &str = "responseBodyNonJson";

/// The status lines a test may expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusReason {
    Ok,
    Created,
    Accepted,
    NoContent,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    Conflict,
    PreconditionFailed,
    InternalServerError,
}

const STATUS_TABLE: [(StatusReason, u16, &str); 12] = [
    (StatusReason::Ok, 200, "OK"),
    (StatusReason::Created, 201, "Created"),
    (StatusReason::Accepted, 202, "Accepted"),
    (StatusReason::NoContent, 204, "No Content"),
    (StatusReason::BadRequest, 400, "Bad Request"),
    (StatusReason::Unauthorized, 401, "Unauthorized"),
    (StatusReason::Forbidden, 403, "Forbidden"),
    (StatusReason::NotFound, 404, "Not Found"),
    (StatusReason::MethodNotAllowed, 405, "Method Not Allowed"),
    (StatusReason::Conflict, 409, "Conflict"),
    (StatusReason::PreconditionFailed, 412, "Precondition Failed"),
    (StatusReason::InternalServerError, 500, "Internal Server Error"),
];

impl StatusReason {
    pub const ALL: [StatusReason; 12] = [
        StatusReason::Ok,
        StatusReason::Created,
        StatusReason::Accepted,
        StatusReason::NoContent,
        StatusReason::BadRequest,
        StatusReason::Unauthorized,
        StatusReason::Forbidden,
        StatusReason::NotFound,
        StatusReason::MethodNotAllowed,
        StatusReason::Conflict,
        StatusReason::PreconditionFailed,
        StatusReason::InternalServerError,
    ];

    fn entry(self) -> (StatusReason, u16, &'static str) {
        STATUS_TABLE[self as usize]
    }

    pub fn code(self) -> u16 {
        self.entry().1
    }

    pub fn reason(self) -> &'static str {
        self.entry().2
    }

    pub fn from_code(code: u16) -> Option<StatusReason> {
        STATUS_TABLE
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(status, _, _)| *status)
    }
}

impl Display for StatusReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}
