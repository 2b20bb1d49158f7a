use crate::{
    data::{DataType, InsertOutcome, UpdateOutcome, is_unique_violation},
    error::{MakeQuerySnafu, RosterResult},
};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use sqlx::PgConnection;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Student {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    /// Inserts the demo student unless someone already holds that email.
    pub async fn seed_demo(conn: &mut PgConnection) -> RosterResult<bool> {
        let inserted = sqlx::query(
            "INSERT INTO public.students (firstname, lastname, email) VALUES ($1, $2, $3) ON CONFLICT (email) DO NOTHING",
        )
        .bind("Charlie")
        .bind("Example")
        .bind("charlie@example.com")
        .execute(conn)
        .await
        .context(MakeQuerySnafu)?
        .rows_affected();

        Ok(inserted > 0)
    }

    pub async fn count(conn: &mut PgConnection) -> RosterResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM public.students")
            .fetch_one(conn)
            .await
            .context(MakeQuerySnafu)
    }
}

/// Submitted create/edit form. Absent fields deserialise as empty so they fail validation rather than the extractor.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StudentForm {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

impl From<Student> for StudentForm {
    fn from(Student { firstname, lastname, email, .. }: Student) -> Self {
        Self {
            firstname,
            lastname,
            email,
        }
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct MissingFields: u8 {
        const FIRSTNAME = 0b0000_0001;
        const LASTNAME =  0b0000_0010;
        const EMAIL =     0b0000_0100;
    }
}

impl MissingFields {
    pub fn as_nice_list(self) -> impl Iterator<Item = &'static str> {
        self.iter().filter_map(|e| match e {
            Self::FIRSTNAME => Some("First name is required"),
            Self::LASTNAME => Some("Last name is required"),
            Self::EMAIL => Some("Email is required"),
            _ => None,
        })
    }
}

impl StudentForm {
    // exact emptiness only, whitespace counts as a value
    pub fn missing_fields(&self) -> MissingFields {
        let mut missing = MissingFields::empty();
        if self.firstname.is_empty() {
            missing |= MissingFields::FIRSTNAME;
        }
        if self.lastname.is_empty() {
            missing |= MissingFields::LASTNAME;
        }
        if self.email.is_empty() {
            missing |= MissingFields::EMAIL;
        }
        missing
    }
}

impl DataType for Student {
    type Id = i32;
    type FormForAdding = StudentForm;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut PgConnection) -> RosterResult<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, firstname, lastname, email FROM public.students WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn get_all(conn: &mut PgConnection) -> RosterResult<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, firstname, lastname, email FROM public.students ORDER BY id ASC",
        )
        .fetch_all(conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut PgConnection,
    ) -> RosterResult<InsertOutcome<Self::Id>> {
        let StudentForm {
            firstname,
            lastname,
            email,
        } = to_be_added;

        let result = sqlx::query_scalar::<_, i32>(
            "INSERT INTO public.students (firstname, lastname, email) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(firstname)
        .bind(lastname)
        .bind(email)
        .fetch_one(conn)
        .await;

        match result {
            Ok(id) => Ok(InsertOutcome::Inserted(id)),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::DuplicateKey),
            Err(source) => Err(source).context(MakeQuerySnafu),
        }
    }

    async fn update_in_database(
        id: Self::Id,
        replacement: Self::FormForAdding,
        conn: &mut PgConnection,
    ) -> RosterResult<UpdateOutcome> {
        let StudentForm {
            firstname,
            lastname,
            email,
        } = replacement;

        let result = sqlx::query(
            "UPDATE public.students SET firstname = $1, lastname = $2, email = $3 WHERE id = $4",
        )
        .bind(firstname)
        .bind(lastname)
        .bind(email)
        .bind(id)
        .execute(conn)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Ok(UpdateOutcome::NotFound),
            Ok(_) => Ok(UpdateOutcome::Updated),
            Err(e) if is_unique_violation(&e) => Ok(UpdateOutcome::DuplicateKey),
            Err(source) => Err(source).context(MakeQuerySnafu),
        }
    }

    async fn remove_from_database(id: Self::Id, conn: &mut PgConnection) -> RosterResult<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "DELETE FROM public.students WHERE id = $1 RETURNING id, firstname, lastname, email",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .context(MakeQuerySnafu)
    }
}
