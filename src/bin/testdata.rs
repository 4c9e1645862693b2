//! Seeds a database with demo accounts and feedback, for local
//! development. All seeded accounts use the password `password`.

use argon2::Argon2;
use argon2::PasswordHasher;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use chrono::Utc;
use clap::Parser;
use diesel::prelude::*;
use diesel_migrations::MigrationHarness;
use uuid::Uuid;

use debrief::MIGRATIONS;
use debrief::schema::{admin_responses, feedback, profiles};

#[derive(Parser)]
pub struct Seed {
    database_url: Option<String>,
    /// Also write a response to each seeded feedback item.
    #[clap(long, short, action)]
    responses: bool,
}

fn main() {
    let args = Seed::parse();
    let db_url = if let Some(url) = args.database_url {
        url
    } else {
        std::env::var("DATABASE_URL").expect(
            "please either set `DATABASE_URL` or pass the `--database-url` flag",
        )
    };

    let mut conn = diesel::SqliteConnection::establish(&db_url).unwrap();

    conn.run_pending_migrations(MIGRATIONS).unwrap();

    let admin_id = ensure_profile(
        "Avery Admin",
        "admin@example.com",
        "admin",
        &mut conn,
    );

    let trainees = [
        ("Tessa Trainee", "tessa@example.com"),
        ("Tom Trainee", "tom@example.com"),
    ];

    let items = [
        (
            "Slow onboarding",
            "Week 1 was unclear; the checklist pointed at retired tools.",
        ),
        (
            "More pairing time",
            "Could we schedule pairing sessions with the platform team?",
        ),
    ];

    for ((name, email), (title, description)) in
        trainees.iter().zip(items.iter())
    {
        let trainee_id = ensure_profile(name, email, "trainee", &mut conn);

        let feedback_id = Uuid::now_v7().to_string();
        diesel::insert_into(feedback::table)
            .values((
                feedback::id.eq(&feedback_id),
                feedback::trainee_id.eq(&trainee_id),
                feedback::title.eq(title),
                feedback::description.eq(description),
                feedback::created_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)
            .unwrap();

        if args.responses {
            diesel::insert_into(admin_responses::table)
                .values((
                    admin_responses::id.eq(Uuid::now_v7().to_string()),
                    admin_responses::feedback_id.eq(&feedback_id),
                    admin_responses::admin_id.eq(&admin_id),
                    admin_responses::response_text
                        .eq("Thanks, we are looking into this."),
                    admin_responses::status.eq("replied"),
                    admin_responses::created_at.eq(Utc::now().naive_utc()),
                ))
                .execute(&mut conn)
                .unwrap();
        }

        println!("seeded {email} with \"{title}\"");
    }
}

fn ensure_profile(
    full_name: &str,
    email: &str,
    role: &str,
    conn: &mut SqliteConnection,
) -> String {
    let existing = profiles::table
        .filter(profiles::email.eq(email))
        .select(profiles::id)
        .first::<String>(conn)
        .optional()
        .unwrap();

    if let Some(id) = existing {
        return id;
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(b"password", &salt)
        .unwrap()
        .to_string();

    let id = Uuid::now_v7().to_string();
    diesel::insert_into(profiles::table)
        .values((
            profiles::id.eq(&id),
            profiles::full_name.eq(full_name),
            profiles::email.eq(email),
            profiles::role.eq(role),
            profiles::password_hash.eq(password_hash),
            profiles::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)
        .unwrap();

    id
}
