//! Board columns: one per status, fixed order. Moving a card is not done
//! here; the UI re-emits the card with a new status and the application
//! store runs its optimistic update.

use crate::models::application::{ApplicationStatus, JobApplication};

#[derive(Debug, Clone)]
pub struct KanbanColumn {
    pub status: ApplicationStatus,
    pub applications: Vec<JobApplication>,
}

/// Partitions a flat list into the fixed status columns, preserving
/// relative order within each column.
pub fn kanban_columns(items: &[JobApplication]) -> Vec<KanbanColumn> {
    ApplicationStatus::ALL
        .iter()
        .map(|&status| KanbanColumn {
            status,
            applications: items
                .iter()
                .filter(|app| app.status == status)
                .cloned()
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::Priority;
    use chrono::Utc;
    use uuid::Uuid;

    fn app(role: &str, status: ApplicationStatus) -> JobApplication {
        JobApplication {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            role_title: role.to_string(),
            status,
            priority: Priority::Medium,
            applied_at: Utc::now(),
            updated_at: Utc::now(),
            match_score: 50,
            salary_min: None,
            salary_max: None,
            document_id: None,
            skills: Vec::new(),
            notes: None,
            source: None,
        }
    }

    #[test]
    fn test_every_status_gets_a_column_in_fixed_order() {
        let columns = kanban_columns(&[]);
        assert_eq!(columns.len(), ApplicationStatus::ALL.len());
        assert_eq!(columns[0].status, ApplicationStatus::Applied);
        assert_eq!(columns[7].status, ApplicationStatus::Ghosted);
    }

    #[test]
    fn test_each_item_appears_in_exactly_one_column() {
        let items = vec![
            app("A", ApplicationStatus::Applied),
            app("B", ApplicationStatus::Offer),
            app("C", ApplicationStatus::Applied),
        ];
        let columns = kanban_columns(&items);
        let placed: usize = columns.iter().map(|c| c.applications.len()).sum();
        assert_eq!(placed, items.len());
    }

    #[test]
    fn test_relative_order_is_preserved_within_a_column() {
        let items = vec![
            app("first", ApplicationStatus::Applied),
            app("other", ApplicationStatus::Offer),
            app("second", ApplicationStatus::Applied),
        ];
        let columns = kanban_columns(&items);
        let applied: Vec<&str> = columns[0]
            .applications
            .iter()
            .map(|a| a.role_title.as_str())
            .collect();
        assert_eq!(applied, vec!["first", "second"]);
    }
}
