use crate::{
    data::{
        DataType, UpdateOutcome,
        student::{MissingFields, Student, StudentForm},
    },
    error::{MissingStudentSnafu, RosterError, RosterResult},
    flash::{FlashLevel, Flashes},
    routes::{reshow_student_form, student_form},
    state::RosterState,
};
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use snafu::OptionExt;

const HEADING: &str = "Edit Student";

fn edit_action(id: i32) -> String {
    format!("/{id}/edit/")
}

pub async fn get_edit(
    State(state): State<RosterState>,
    flashes: Flashes,
    Path(id): Path<i32>,
) -> RosterResult<Markup> {
    let student = Student::get_from_db_by_id(id, &mut *state.get_connection().await?)
        .await?
        .context(MissingStudentSnafu { id })?;

    let flashes = flashes.take().await?;
    Ok(state.render(
        &flashes,
        html! {
            (student_form(HEADING, &edit_action(id), &StudentForm::from(student), MissingFields::empty()))
        },
    ))
}

pub async fn post_edit(
    State(state): State<RosterState>,
    flashes: Flashes,
    Path(id): Path<i32>,
    Form(form): Form<StudentForm>,
) -> RosterResult<Response> {
    let missing = form.missing_fields();
    if !missing.is_empty() {
        flashes
            .surface(FlashLevel::Danger, "All fields are required!")
            .await?;
        return reshow_student_form(
            &state,
            &flashes,
            StatusCode::UNPROCESSABLE_ENTITY,
            student_form(HEADING, &edit_action(id), &form, missing),
        )
        .await;
    }

    let outcome =
        Student::update_in_database(id, form.clone(), &mut *state.get_connection().await?).await?;
    match outcome {
        UpdateOutcome::Updated => {
            info!(id, "Updated student");
            flashes
                .surface(FlashLevel::Success, "Student updated successfully!")
                .await?;
            Ok(Redirect::to("/").into_response())
        }
        UpdateOutcome::NotFound => Err(RosterError::MissingStudent { id }),
        UpdateOutcome::DuplicateKey => {
            flashes
                .surface(
                    FlashLevel::Danger,
                    format!("A student with the email {} already exists.", form.email),
                )
                .await?;
            reshow_student_form(
                &state,
                &flashes,
                StatusCode::CONFLICT,
                student_form(HEADING, &edit_action(id), &form, MissingFields::empty()),
            )
            .await
        }
    }
}
