use crate::{
    data::{DataType, student::Student},
    error::{RosterError, RosterResult},
    flash::{FlashLevel, Flashes},
    maud_conveniences::render_table,
    state::RosterState,
};
use axum::extract::State;
use maud::{Markup, html};

async fn load_roster(state: &RosterState) -> RosterResult<Vec<Student>> {
    Student::get_all(&mut *state.get_connection().await?).await
}

pub async fn get_index_route(
    State(state): State<RosterState>,
    flashes: Flashes,
) -> RosterResult<Markup> {
    let students = match load_roster(&state).await {
        Ok(students) => students,
        Err(e) => {
            warn!(?e, "Unable to load students, showing an empty roster");
            let message = match e {
                RosterError::GetDatabaseConnection { .. } => {
                    "Database connection could not be established."
                }
                _ => "The student list could not be loaded.",
            };
            flashes.surface(FlashLevel::Danger, message).await?;
            vec![]
        }
    };

    let is_empty = students.is_empty();
    let table = render_table(
        "Students",
        ["ID", "First Name", "Last Name", "Email", ""],
        students
            .into_iter()
            .map(|student| {
                [
                    html! {(student.id)},
                    html! {(student.firstname)},
                    html! {(student.lastname)},
                    html! {(student.email)},
                    student_actions(student.id),
                ]
            })
            .collect(),
    );

    let flashes = flashes.take().await?;
    Ok(state.render(
        &flashes,
        html! {
            div class="bg-gray-800 p-8 rounded shadow-md w-full flex flex-col space-y-4" {
                (table)
                @if is_empty {
                    p class="italic text-gray-400" {"No students yet."}
                }
                div {
                    a href="/create/" class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" {"Add new Student"}
                }
            }
        },
    ))
}

fn student_actions(id: i32) -> Markup {
    html! {
        div class="flex flex-row space-x-2" {
            a href={"/" (id) "/edit/"} class="bg-slate-600 hover:bg-slate-800 font-bold py-1 px-3 rounded" {"Edit"}
            form method="post" action={"/" (id) "/delete/"} onsubmit="return confirm('Delete this student?');" {
                button type="submit" class="bg-red-600 hover:bg-red-800 font-bold py-1 px-3 rounded" {"Delete"}
            }
        }
    }
}
