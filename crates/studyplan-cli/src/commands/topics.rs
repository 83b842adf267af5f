use clap::Subcommand;
use studyplan_core::{ApiClient, NewTopic, Topic, TopicUpdate};

#[derive(Subcommand)]
pub enum TopicsAction {
    /// List the topics of a subject
    List {
        /// Subject ID
        subject_id: i64,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add a topic under a subject
    Add {
        /// Subject ID
        subject_id: i64,
        /// Topic title
        title: String,
        /// Estimated minutes (default: 30)
        #[arg(long)]
        minutes: Option<i64>,
    },
    /// Update a topic
    Update {
        /// Topic ID
        id: i64,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New estimate in minutes
        #[arg(long)]
        minutes: Option<i64>,
        /// Mark completed (true/false)
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Delete a topic
    Delete {
        /// Topic ID
        id: i64,
    },
}

fn topic_line(topic: &Topic) -> String {
    let mark = if topic.completed { "x" } else { " " };
    format!(
        "{:>4}  [{mark}] {}  ({} min)",
        topic.id, topic.title, topic.estimated_minutes
    )
}

pub async fn run(action: TopicsAction, api: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TopicsAction::List { subject_id, json } => {
            let topics = api.list_topics(subject_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&topics)?);
            } else if topics.is_empty() {
                println!("No topics for subject {subject_id}.");
            } else {
                for topic in &topics {
                    println!("{}", topic_line(topic));
                }
            }
        }
        TopicsAction::Add {
            subject_id,
            title,
            minutes,
        } => {
            let topic = api
                .create_topic(
                    subject_id,
                    &NewTopic {
                        title: Some(title),
                        estimated_minutes: minutes,
                    },
                )
                .await?;
            println!("Topic created: {}", topic.id);
            println!("{}", serde_json::to_string_pretty(&topic)?);
        }
        TopicsAction::Update {
            id,
            title,
            minutes,
            completed,
        } => {
            let update = TopicUpdate {
                title,
                estimated_minutes: minutes,
                completed,
            };
            if update.is_empty() {
                return Err("nothing to update: pass --title, --minutes or --completed".into());
            }
            let topic = api.update_topic(id, &update).await?;
            println!("Topic updated:");
            println!("{}", serde_json::to_string_pretty(&topic)?);
        }
        TopicsAction::Delete { id } => {
            api.delete_topic(id).await?;
            println!("Topic deleted: {id}");
        }
    }
    Ok(())
}
