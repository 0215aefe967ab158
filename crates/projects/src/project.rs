use chrono::{DateTime, Utc};

use entipedia_core::{Entity, ProjectId};

use crate::value_objects::{ProjectName, ProjectPriority, ProjectStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectProps {
    pub id: ProjectId,
    pub name: ProjectName,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: ProjectPriority,
    pub created_at: DateTime<Utc>,
}

/// Partial update of a project. A kanban drag-and-drop only sets `status`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub name: Option<ProjectName>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<ProjectPriority>,
}

/// Entity: a tracked project.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    props: ProjectProps,
}

impl Project {
    pub fn from_props(props: ProjectProps) -> Self {
        Self { props }
    }

    pub fn name(&self) -> &ProjectName {
        &self.props.name
    }

    pub fn description(&self) -> &str {
        &self.props.description
    }

    pub fn status(&self) -> ProjectStatus {
        self.props.status
    }

    pub fn priority(&self) -> ProjectPriority {
        self.props.priority
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.props.created_at
    }

    pub fn move_to(&mut self, status: ProjectStatus) {
        self.props.status = status;
    }

    pub fn apply(&mut self, patch: &ProjectPatch) {
        if let Some(name) = &patch.name {
            self.props.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.props.description = description.trim().to_string();
        }
        if let Some(status) = patch.status {
            self.move_to(status);
        }
        if let Some(priority) = patch.priority {
            self.props.priority = priority;
        }
    }
}

impl Entity for Project {
    type Id = ProjectId;

    fn id(&self) -> &Self::Id {
        &self.props.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_and_drop_only_moves_the_card() {
        let mut project = Project::from_props(ProjectProps {
            id: ProjectId::new(),
            name: ProjectName::new("Rebrand").unwrap(),
            description: "New logo and palette".to_string(),
            status: ProjectStatus::default(),
            priority: ProjectPriority::default(),
            created_at: Utc::now(),
        });
        let before = project.clone();

        project.apply(&ProjectPatch {
            status: Some(ProjectStatus::InReview),
            ..ProjectPatch::default()
        });

        assert_eq!(project.status(), ProjectStatus::InReview);
        assert_eq!(project.name(), before.name());
        assert_eq!(project.description(), before.description());
        assert_eq!(project.priority(), ProjectPriority::Medium);
        assert_eq!(project.id(), before.id());
    }
}
