use clap::Subcommand;
use studyplan_core::{ApiClient, NewSubject, Subject};

#[derive(Subcommand)]
pub enum SubjectsAction {
    /// List subjects
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add a subject
    Add {
        /// Subject name
        name: String,
        /// Priority (default: 1)
        #[arg(long)]
        priority: Option<i64>,
        /// Display color, e.g. "#3b82f6"
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a subject and its topics
    Delete {
        /// Subject ID
        id: i64,
    },
}

fn subject_line(subject: &Subject) -> String {
    match &subject.color {
        Some(color) => format!(
            "{:>4}  {}  (priority {}, {color})",
            subject.id, subject.name, subject.priority
        ),
        None => format!("{:>4}  {}  (priority {})", subject.id, subject.name, subject.priority),
    }
}

pub async fn run(action: SubjectsAction, api: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SubjectsAction::List { json } => {
            let subjects = api.list_subjects().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&subjects)?);
            } else if subjects.is_empty() {
                println!("No subjects yet.");
            } else {
                for subject in &subjects {
                    println!("{}", subject_line(subject));
                }
            }
        }
        SubjectsAction::Add {
            name,
            priority,
            color,
        } => {
            let subject = api
                .create_subject(&NewSubject {
                    name: Some(name),
                    priority,
                    color,
                })
                .await?;
            println!("Subject created: {}", subject.id);
            println!("{}", serde_json::to_string_pretty(&subject)?);
        }
        SubjectsAction::Delete { id } => {
            api.delete_subject(id).await?;
            println!("Subject deleted: {id}");
        }
    }
    Ok(())
}
