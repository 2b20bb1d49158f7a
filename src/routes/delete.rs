use crate::{
    data::{DataType, student::Student},
    error::RosterResult,
    flash::{FlashLevel, Flashes},
    state::RosterState,
};
use axum::{
    extract::{Path, State},
    response::Redirect,
};

pub async fn post_delete(
    State(state): State<RosterState>,
    flashes: Flashes,
    Path(id): Path<i32>,
) -> RosterResult<Redirect> {
    match Student::remove_from_database(id, &mut *state.get_connection().await?).await? {
        Some(student) => {
            info!(id, "Deleted student");
            flashes
                .surface(
                    FlashLevel::Success,
                    format!("\"{}\" was successfully deleted!", student.full_name()),
                )
                .await?;
        }
        None => {
            warn!(id, "Tried to delete a student that doesn't exist");
            flashes
                .surface(
                    FlashLevel::Warning,
                    format!("No student with ID {id} exists; nothing was deleted."),
                )
                .await?;
        }
    }

    Ok(Redirect::to("/"))
}
