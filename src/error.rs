use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::html;
use snafu::Snafu;
use std::{num::ParseIntError, str::ParseBoolError};

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    Migrate { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to parse env var `{}` as a number: {:?}", name, original))]
    ParseNumber {
        source: ParseIntError,
        name: &'static str,
        original: String,
    },
    #[snafu(display("Unable to parse env var `{}` as true/false: {:?}", name, original))]
    ParseFlag {
        source: ParseBoolError,
        name: &'static str,
        original: String,
    },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: i32 },
    #[snafu(display("Error with sessions"))]
    TowerSession {
        source: tower_sessions::session::Error,
    },
}

impl RosterError {
    #[allow(clippy::match_same_arms)]
    pub fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const SU: StatusCode = StatusCode::SERVICE_UNAVAILABLE; //store unreachable

        match self {
            Self::GetDatabaseConnection { .. } => SU,
            Self::MakeQuery {
                source: sqlx::Error::RowNotFound,
            } => NF,
            Self::MakeQuery { .. } | Self::Migrate { .. } => ISE,
            Self::ParseNumber { .. } | Self::ParseFlag { .. } => ISE,
            Self::MissingStudent { .. } => NF,
            Self::TowerSession { .. } => ISE,
        }
    }
}

impl IntoResponse for RosterError {
    fn into_response(self) -> Response {
        let basic_error = |desc| {
            html! {
                div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                    strong class="font-bold" {"Roster Error: "}
                    span {(desc)}
                    br;
                    a href="/" class="underline" {"Back to the roster"}
                }
            }
        };

        let status_code = self.status_code();
        error!(?self, %status_code, "Error!");
        (status_code, Html(basic_error(self.to_string()))).into_response()
    }
}
