use campus_match_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    models::{ConnectionIntent, PersonalityType},
    services::auth_service::hash_password,
};
use uuid::Uuid;

struct DemoStudent {
    email: &'static str,
    name: &'static str,
    age: i32,
    gender: &'static str,
    branch: &'static str,
    personality: PersonalityType,
    intent: ConnectionIntent,
    interests: &'static [&'static str],
}

const COLLEGE: &str = "Demo Institute of Technology";
const PASSWORD: &str = "password123";

const STUDENTS: &[DemoStudent] = &[
    DemoStudent {
        email: "aarav@example.edu",
        name: "Aarav",
        age: 20,
        gender: "male",
        branch: "Computer Science",
        personality: PersonalityType::Introvert,
        intent: ConnectionIntent::StudyBuddy,
        interests: &["coding", "chess", "music"],
    },
    DemoStudent {
        email: "diya@example.edu",
        name: "Diya",
        age: 21,
        gender: "female",
        branch: "Electronics",
        personality: PersonalityType::Extrovert,
        intent: ConnectionIntent::FestAndFun,
        interests: &["music", "dance", "travel"],
    },
    DemoStudent {
        email: "kabir@example.edu",
        name: "Kabir",
        age: 22,
        gender: "male",
        branch: "Mechanical",
        personality: PersonalityType::Ambivert,
        intent: ConnectionIntent::GenuineConnection,
        interests: &["football", "travel", "photography"],
    },
    DemoStudent {
        email: "meera@example.edu",
        name: "Meera",
        age: 19,
        gender: "female",
        branch: "Design",
        personality: PersonalityType::Introvert,
        intent: ConnectionIntent::JustVibing,
        interests: &["art", "photography", "coding"],
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    for student in STUDENTS {
        let id = ensure_student(&pool, student).await?;
        println!("Ensured {} ({id})", student.email);
    }

    println!("Seed completed. Password for every demo account: {PASSWORD}");
    Ok(())
}

async fn ensure_student(pool: &sqlx::PgPool, student: &DemoStudent) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(PASSWORD).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let interests: Vec<String> = student.interests.iter().map(|i| i.to_string()).collect();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (
            id, email, password_hash, name, college, verified,
            age, gender, branch, personality_type, connection_intent, interests
        )
        VALUES ($1, $2, $3, $4, $5, TRUE, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student.email)
    .bind(password_hash)
    .bind(student.name)
    .bind(COLLEGE)
    .bind(student.age)
    .bind(student.gender)
    .bind(student.branch)
    .bind(student.personality.as_str())
    .bind(student.intent.as_str())
    .bind(&interests)
    .fetch_optional(pool)
    .await?;

    // Already seeded on an earlier run.
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(student.email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };
    Ok(user_id)
}
