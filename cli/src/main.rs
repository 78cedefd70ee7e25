use clap::{Parser, Subcommand};
use corso::config::StorageBackend;
use corso::model::ModelManager;
use corso::model::entity::{
    ContentType, CourseCreate, EnrollmentKind, LessonCreate, LessonType, ModuleCreate, UserCreate,
};
use corso::model::DbConnection;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for seeding the learning platform", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage modules
    Module {
        #[command(subcommand)]
        action: ModuleCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },

    /// Enroll a user into a course
    Enroll {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        course_id: i64,
        /// "student" or "trainer"
        #[arg(long, default_value = "student")]
        kind: String,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        login: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: String,
        #[arg(long, default_value = "student")]
        role: String,
    },
}

/// Course management
#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value_t = 0)]
        duration_hours: i32,
    },
}

/// Module management
#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    Add {
        #[arg(long)]
        course_id: i64,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = 0)]
        order: i32,
    },
}

/// Lesson management
#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        #[arg(long)]
        course_id: i64,
        /// Module id to attach the lesson to
        #[arg(long)]
        module_id: Option<i64>,
        #[arg(long)]
        title: String,
        /// Path to a file with lesson content
        #[arg(long)]
        file: String,
        #[arg(long, default_value_t = 0)]
        order: i32,
        #[arg(long, default_value = "theory")]
        lesson_type: String,
    },
}

async fn open_storage() -> corso::error::AppResult<ModelManager> {
    let config = corso::Config::get_or_init(true).await;
    let mm = match config.storage().backend() {
        StorageBackend::Postgres => {
            let uri = config
                .storage()
                .database_uri()
                .expect("storage.database_uri must be set for the postgres backend");
            ModelManager::postgres(DbConnection::connect(uri)?)
        }
        StorageBackend::Json => {
            let data_dir = config.storage().data_dir().unwrap_or("./data");
            ModelManager::json(data_dir).await?
        }
    };
    Ok(mm)
}

#[tokio::main]
async fn main() -> corso::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let mm = open_storage().await?;

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add {
                login,
                password,
                full_name,
                role,
            } => {
                let user = mm
                    .store()
                    .create_user(UserCreate {
                        login,
                        password_hash: corso::auth::hash_password(&password).unwrap(),
                        full_name,
                        role,
                        company: None,
                        department: None,
                        position: None,
                    })
                    .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add {
                title,
                description,
                duration_hours,
            } => {
                let course = mm
                    .store()
                    .create_course(CourseCreate {
                        title,
                        description,
                        short_description: None,
                        image_url: None,
                        duration_hours,
                        tags: Vec::new(),
                        requirements: Vec::new(),
                        what_you_learn: Vec::new(),
                    })
                    .await?;
                println!("Course created: {:?}", course);
            }
        },

        Commands::Module { action } => match action {
            ModuleCommands::Add {
                course_id,
                title,
                description,
                order,
            } => {
                let module = mm
                    .store()
                    .create_module(ModuleCreate {
                        course_id,
                        title,
                        description,
                        order,
                        is_published: true,
                    })
                    .await?;
                println!("Module created: {:?}", module);
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add {
                course_id,
                module_id,
                title,
                file,
                order,
                lesson_type,
            } => {
                let content = std::fs::read_to_string(file)?;
                let lesson = mm
                    .store()
                    .create_lesson(LessonCreate {
                        course_id,
                        module_id,
                        title,
                        content_type: ContentType::Text,
                        content_url: None,
                        content_text: Some(content),
                        duration_minutes: 0,
                        order,
                        lesson_type: LessonType::parse(&lesson_type),
                        is_published: true,
                    })
                    .await?;
                println!("Lesson created: {:?}", lesson);
            }
        },

        Commands::Enroll {
            user_id,
            course_id,
            kind,
        } => {
            let kind = match kind.as_str() {
                "trainer" => EnrollmentKind::Trainer,
                _ => EnrollmentKind::Student,
            };
            let enrollment = mm.graph().enroll(user_id, course_id, kind).await?;
            println!("Enrolled: {:?}", enrollment);
        }
    }

    Ok(())
}
