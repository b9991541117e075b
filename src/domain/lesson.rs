//! Lesson and content domain entities, plus the server-built lesson tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lesson domain entity.
///
/// A lesson with a `parent_id` is a sublesson; nesting is one level deep.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Lesson {
    pub id: Uuid,
    pub title: String,
    pub course_id: Uuid,
    pub video_url: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Content block kinds within a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Video,
    Image,
    Code,
    Quiz,
    Pdf,
}

impl ContentKind {
    /// Canonical lowercase string for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Video => "video",
            ContentKind::Image => "image",
            ContentKind::Code => "code",
            ContentKind::Quiz => "quiz",
            ContentKind::Pdf => "pdf",
        }
    }

    /// Parse a stored kind string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(ContentKind::Text),
            "video" => Some(ContentKind::Video),
            "image" => Some(ContentKind::Image),
            "code" => Some(ContentKind::Code),
            "quiz" => Some(ContentKind::Quiz),
            "pdf" => Some(ContentKind::Pdf),
            _ => None,
        }
    }
}

/// One content block within a lesson, ordered by `position`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Content {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub kind: ContentKind,
    /// String payload; interpretation depends on `kind`
    pub body: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a lesson (admin)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLesson {
    pub title: String,
    pub course_id: Uuid,
    pub video_url: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// Fields for updating a lesson (admin); absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateLesson {
    pub title: Option<String>,
    pub video_url: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// Fields for creating a content block (admin)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateContent {
    pub lesson_id: Uuid,
    pub kind: ContentKind,
    pub body: String,
    #[serde(default)]
    pub position: i32,
}

/// Fields for updating a content block (admin)
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateContent {
    pub kind: Option<ContentKind>,
    pub body: Option<String>,
    pub position: Option<i32>,
}

/// A lesson together with its ordered content blocks.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LessonDetail {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub contents: Vec<Content>,
}

/// A lesson with its sublessons nested beneath it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LessonNode {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub children: Vec<LessonNode>,
}

/// Build the lesson tree for a course from its flat lesson list.
///
/// Parents keep the input order; children nest under their parent in input
/// order. A lesson referencing a missing parent is treated as a root so it
/// is never silently dropped.
pub fn build_lesson_tree(lessons: Vec<Lesson>) -> Vec<LessonNode> {
    let known: std::collections::HashSet<Uuid> = lessons.iter().map(|l| l.id).collect();

    let (children, roots): (Vec<Lesson>, Vec<Lesson>) = lessons
        .into_iter()
        .partition(|l| l.parent_id.map(|p| known.contains(&p)).unwrap_or(false));

    let mut by_parent: std::collections::HashMap<Uuid, Vec<Lesson>> =
        std::collections::HashMap::new();
    for child in children {
        if let Some(parent_id) = child.parent_id {
            by_parent.entry(parent_id).or_default().push(child);
        }
    }

    roots
        .into_iter()
        .map(|root| {
            let children = by_parent
                .remove(&root.id)
                .unwrap_or_default()
                .into_iter()
                .map(|child| LessonNode {
                    lesson: child,
                    children: Vec::new(),
                })
                .collect();
            LessonNode {
                lesson: root,
                children,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: Uuid, title: &str, parent_id: Option<Uuid>) -> Lesson {
        Lesson {
            id,
            title: title.to_string(),
            course_id: Uuid::new_v4(),
            video_url: None,
            description: None,
            thumbnail_url: None,
            parent_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn children_nest_under_their_parent() {
        let parent_id = Uuid::new_v4();
        let lessons = vec![
            lesson(parent_id, "Intro", None),
            lesson(Uuid::new_v4(), "Intro: setup", Some(parent_id)),
            lesson(Uuid::new_v4(), "Intro: tooling", Some(parent_id)),
            lesson(Uuid::new_v4(), "Ownership", None),
        ];

        let tree = build_lesson_tree(lessons);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].lesson.title, "Intro");
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].lesson.title, "Intro: setup");
        assert_eq!(tree[1].lesson.title, "Ownership");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn orphaned_child_becomes_a_root() {
        let lessons = vec![lesson(Uuid::new_v4(), "Stray", Some(Uuid::new_v4()))];
        let tree = build_lesson_tree(lessons);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].lesson.title, "Stray");
    }

    #[test]
    fn empty_input_yields_empty_tree() {
        assert!(build_lesson_tree(Vec::new()).is_empty());
    }

    #[test]
    fn content_kind_round_trips() {
        for kind in [
            ContentKind::Text,
            ContentKind::Video,
            ContentKind::Image,
            ContentKind::Code,
            ContentKind::Quiz,
            ContentKind::Pdf,
        ] {
            assert_eq!(ContentKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ContentKind::parse("markdown"), None);
    }
}
