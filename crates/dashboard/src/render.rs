// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Pure rendering: `Session` in, `View` out.

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::session::{Session, ToastKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeRow {
    /// Position within the user's sequence; what a delete refers to.
    pub index: usize,
    pub tooltip: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSection {
    pub user_id: String,
    /// Set when the section is shown because it matched the search.
    pub highlighted: bool,
    pub badges: Vec<BadgeRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Empty,
    NoResults { term: String },
    Users(Vec<UserSection>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteModal {
    pub user_label: String,
    pub tooltip: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub body: Body,
    pub clear_search_visible: bool,
    pub url_input_enabled: bool,
    pub file_input_enabled: bool,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
    /// The attached image is being sent to the image host.
    pub uploading: bool,
    pub preview: Option<String>,
    pub delete_modal: Option<DeleteModal>,
    pub toast: Option<(String, ToastKind)>,
}

pub fn render(session: &Session) -> View {
    let term = session.search_term();
    let visible = session.visible_badges();

    let body = if visible.is_empty() {
        match term {
            Some(term) => Body::NoResults { term: term.to_string() },
            None => Body::Empty,
        }
    } else {
        Body::Users(
            visible
                .iter()
                .map(|(user_id, badges)| UserSection {
                    user_id: user_id.clone(),
                    highlighted: term.is_some(),
                    badges: badges
                        .iter()
                        .enumerate()
                        .map(|(index, b)| BadgeRow {
                            index,
                            tooltip: b.tooltip.clone(),
                            url: b.badge.clone(),
                        })
                        .collect(),
                })
                .collect(),
        )
    };

    View {
        body,
        clear_search_visible: term.is_some(),
        url_input_enabled: session.form.url_enabled(),
        file_input_enabled: session.form.file_enabled(),
        submit_enabled: !session.is_busy(),
        submit_label: if session.is_busy() { "Adding Badge..." } else { "Add Badge" },
        uploading: session.is_uploading(),
        preview: session.preview.clone(),
        delete_modal: session.pending_delete.as_ref().map(|p| DeleteModal {
            user_label: format!("User ID: {}", p.user_id),
            tooltip: p.tooltip.clone(),
            image_url: p.badge_url.clone(),
        }),
        toast: session.toast.as_ref().map(|t| (t.message.clone(), t.kind)),
    }
}

/// Terminal rendering of the badge list.
pub fn to_table(view: &View) -> String {
    match &view.body {
        Body::Empty => "No badges yet\nAdd your first badge with `badges add`".to_string(),
        Body::NoResults { term } => format!("No results found\nNo badges found for \"{}\"", term),
        Body::Users(sections) => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["User ID", "#", "Tooltip", "Badge URL"]);

            for section in sections {
                for row in &section.badges {
                    let user = Cell::new(&section.user_id);
                    let user = if section.highlighted { user.fg(Color::Yellow) } else { user };
                    table.add_row(vec![
                        user,
                        Cell::new(row.index),
                        Cell::new(&row.tooltip),
                        Cell::new(&row.url),
                    ]);
                }
            }
            table.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Submission, SubmitStage};
    use badge_kernel::{Badge, BadgeCollection};

    fn session() -> Session {
        let mut c = BadgeCollection::new();
        c.push("100", Badge::new("A", "http://x/a.png"));
        c.push("100", Badge::new("B", "http://x/b.png"));
        c.push("200", Badge::new("C", "http://x/c.png"));
        let mut s = Session::new();
        s.set_listing(c, None);
        s
    }

    #[test]
    fn test_empty_state() {
        let view = render(&Session::new());
        assert_eq!(view.body, Body::Empty);
        assert!(!view.clear_search_visible);
    }

    #[test]
    fn test_sections_carry_positions() {
        let view = render(&session());
        let Body::Users(sections) = view.body else {
            panic!("expected users");
        };
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].user_id, "100");
        assert_eq!(sections[0].badges[1], BadgeRow { index: 1, tooltip: "B".into(), url: "http://x/b.png".into() });
        assert!(!sections[0].highlighted);
    }

    #[test]
    fn test_search_highlights_and_no_results() {
        let mut s = session();
        s.set_search("10".to_string());
        let view = render(&s);
        assert!(view.clear_search_visible);
        match view.body {
            Body::Users(sections) => {
                assert_eq!(sections.len(), 1);
                assert!(sections[0].highlighted);
            }
            other => panic!("unexpected body {:?}", other),
        }

        s.set_search("999".to_string());
        assert_eq!(render(&s).body, Body::NoResults { term: "999".to_string() });
    }

    #[test]
    fn test_delete_modal_and_busy_button() {
        let mut s = session();
        s.request_delete("200", 0);
        s.submission = Some(Submission {
            user_id: "300".to_string(),
            tooltip: "D".to_string(),
            stage: SubmitStage::Save { badge_url: "http://x/d.png".to_string() },
        });

        let view = render(&s);
        assert_eq!(
            view.delete_modal,
            Some(DeleteModal {
                user_label: "User ID: 200".to_string(),
                tooltip: "C".to_string(),
                image_url: "http://x/c.png".to_string(),
            })
        );
        assert!(!view.submit_enabled);
        assert_eq!(view.submit_label, "Adding Badge...");
        assert!(!view.uploading);
    }

    #[test]
    fn test_table_lists_every_badge() {
        let text = to_table(&render(&session()));
        assert!(text.contains("http://x/a.png"));
        assert!(text.contains("http://x/c.png"));
        assert!(text.contains("Tooltip"));
    }
}
