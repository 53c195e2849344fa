//! Survey row classification and group tracking.
//!
//! Rows are streamed in order. `begin_group` opens a group, `end_group`
//! closes the current one and appends it to the document, `note` and
//! `form_title` rows are skipped, anything else becomes a question.
//!
//! Two nesting policies exist:
//!
//! - [`NestingPolicy::SingleSlot`]: one open group at a time. A second
//!   `begin_group` discards the group already open, with its questions.
//! - [`NestingPolicy::Stack`]: groups nest. `end_group` closes the innermost
//!   one, so inner groups land in the document before their parent.
//!
//! Under both policies an `end_group` with nothing open is ignored and
//! groups still open when the rows run out are dropped.
//!
//! Group names are unique in the output. A closed group whose name was
//! already emitted is merged into the earlier one (attributes of the first
//! win). Ungrouped questions go to the group named `default`, which is an
//! explicit `begin_group default` if one came first.

use serde::{Deserialize, Serialize};

use super::question::build_question;
use crate::api::logs::{log_info_indent, log_warning};
use crate::models::{FormGroup, LocalizedText, Question, DEFAULT_GROUP_NAME};
use crate::source::{Row, Sheet};

/// How `begin_group` rows nest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum NestingPolicy {
    /// One open group; a new `begin_group` replaces it.
    #[default]
    #[serde(rename = "single")]
    #[value(name = "single")]
    SingleSlot,
    /// Open groups form a stack.
    #[serde(rename = "stack")]
    #[value(name = "stack")]
    Stack,
}

/// What a survey row means structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    BeginGroup,
    EndGroup,
    FormTitle,
    Note,
    Question,
}

impl RowKind {
    /// Classify a `type` cell. Group keywords accept `begin group` as well
    /// as `begin_group`, in any case.
    pub fn classify(row_type: &str) -> Self {
        let normalized = row_type
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase();

        match normalized.as_str() {
            "begin_group" => RowKind::BeginGroup,
            "end_group" => RowKind::EndGroup,
            "form_title" => RowKind::FormTitle,
            "note" => RowKind::Note,
            _ => RowKind::Question,
        }
    }
}

/// Stream the survey rows and return the groups in document order.
pub fn build_groups(survey: &Sheet, choices: &Sheet, policy: NestingPolicy) -> Vec<FormGroup> {
    let mut tracker = GroupTracker::new(policy);

    for (index, row) in survey.rows.iter().enumerate() {
        // header is line 1
        let line = index + 2;

        let Some(row_type) = row.text("type") else {
            log_warning(format!("Survey line {}: no type, row skipped", line));
            continue;
        };

        match RowKind::classify(&row_type) {
            RowKind::BeginGroup => tracker.begin(open_group(row), line),
            RowKind::EndGroup => tracker.end(line),
            RowKind::FormTitle | RowKind::Note => {}
            RowKind::Question => tracker.push(build_question(row, choices)),
        }
    }

    tracker.finish()
}

fn open_group(row: &Row) -> FormGroup {
    let mut group = FormGroup::new(
        row.text("name").unwrap_or_default(),
        LocalizedText::new(row.text("label").unwrap_or_default()),
    );
    group.appearance = row.text("appearance");
    group.relevant = row.text("relevant");
    group
}

/// Open groups plus the groups already flushed to the document.
struct GroupTracker {
    policy: NestingPolicy,
    open: Vec<FormGroup>,
    /// Closed groups, names unique.
    groups: Vec<FormGroup>,
}

impl GroupTracker {
    fn new(policy: NestingPolicy) -> Self {
        Self {
            policy,
            open: Vec::new(),
            groups: Vec::new(),
        }
    }

    fn begin(&mut self, group: FormGroup, line: usize) {
        if self.policy == NestingPolicy::SingleSlot {
            if let Some(discarded) = self.open.pop() {
                log_warning(format!(
                    "Survey line {}: group '{}' opened while '{}' was still open, '{}' discarded with {} question(s)",
                    line,
                    group.name,
                    discarded.name,
                    discarded.name,
                    discarded.questions.len()
                ));
            }
        }
        let depth = u8::try_from(self.open.len()).unwrap_or(u8::MAX);
        log_info_indent(format!("Group '{}'", group.name), depth);
        self.open.push(group);
    }

    fn end(&mut self, line: usize) {
        match self.open.pop() {
            Some(group) => self.flush(group, line),
            None => log_warning(format!("Survey line {}: end_group without open group, ignored", line)),
        }
    }

    fn flush(&mut self, group: FormGroup, line: usize) {
        match self.position(&group.name) {
            Some(index) => {
                log_warning(format!(
                    "Survey line {}: group '{}' already defined, {} question(s) merged into it",
                    line,
                    group.name,
                    group.questions.len()
                ));
                self.groups[index].questions.extend(group.questions);
            }
            None => self.groups.push(group),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }

    fn push(&mut self, question: Question) {
        if let Some(group) = self.open.last_mut() {
            group.questions.push(question);
            return;
        }

        let index = match self.position(DEFAULT_GROUP_NAME) {
            Some(index) => index,
            None => {
                self.groups.push(FormGroup::synthetic_default());
                self.groups.len() - 1
            }
        };
        self.groups[index].questions.push(question);
    }

    fn finish(self) -> Vec<FormGroup> {
        for group in &self.open {
            log_warning(format!(
                "Group '{}' never closed, dropped with {} question(s)",
                group.name,
                group.questions.len()
            ));
        }
        self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn survey(rows: Vec<Value>) -> Sheet {
        Sheet::from_records("survey", rows)
    }

    fn no_choices() -> Sheet {
        Sheet::new("choices", vec!["list_name".into(), "name".into(), "label".into()])
    }

    fn names(group: &FormGroup) -> Vec<&str> {
        group.questions.iter().map(|q| q.name.as_str()).collect()
    }

    #[test]
    fn test_classify() {
        assert_eq!(RowKind::classify("begin_group"), RowKind::BeginGroup);
        assert_eq!(RowKind::classify("begin group"), RowKind::BeginGroup);
        assert_eq!(RowKind::classify(" End_Group "), RowKind::EndGroup);
        assert_eq!(RowKind::classify("form_title"), RowKind::FormTitle);
        assert_eq!(RowKind::classify("note"), RowKind::Note);
        assert_eq!(RowKind::classify("select_one"), RowKind::Question);
        assert_eq!(RowKind::classify("begin_repeat"), RowKind::Question);
    }

    #[test]
    fn test_empty_group_kept() {
        let rows = survey(vec![
            json!({ "type": "begin_group", "name": "g1", "label": "G1" }),
            json!({ "type": "end_group" }),
        ]);
        let groups = build_groups(&rows, &no_choices(), NestingPolicy::SingleSlot);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "g1");
        assert!(groups[0].questions.is_empty());
    }

    #[test]
    fn test_group_attributes() {
        let rows = survey(vec![
            json!({
                "type": "begin_group",
                "name": "hh",
                "label": "Household",
                "appearance": "field-list",
                "relevant": "${consent} = 'yes'"
            }),
            json!({ "type": "integer", "name": "size", "label": "Size" }),
            json!({ "type": "end_group" }),
        ]);
        let groups = build_groups(&rows, &no_choices(), NestingPolicy::SingleSlot);
        assert_eq!(groups[0].label.default_text(), Some("Household"));
        assert_eq!(groups[0].appearance.as_deref(), Some("field-list"));
        assert_eq!(groups[0].relevant.as_deref(), Some("${consent} = 'yes'"));
        assert_eq!(names(&groups[0]), vec!["size"]);
    }

    #[test]
    fn test_notes_and_title_skipped() {
        let rows = survey(vec![
            json!({ "type": "form_title", "label": "Census" }),
            json!({ "type": "note", "name": "intro", "label": "Welcome" }),
            json!({ "type": "text", "name": "q1", "label": "Name" }),
        ]);
        let groups = build_groups(&rows, &no_choices(), NestingPolicy::SingleSlot);
        assert_eq!(groups.len(), 1);
        assert_eq!(names(&groups[0]), vec!["q1"]);
    }

    #[test]
    fn test_single_default_group_reused() {
        let rows = survey(vec![
            json!({ "type": "text", "name": "a" }),
            json!({ "type": "text", "name": "b" }),
            json!({ "type": "begin_group", "name": "g1", "label": "G1" }),
            json!({ "type": "text", "name": "c" }),
            json!({ "type": "end_group" }),
            json!({ "type": "text", "name": "d" }),
        ]);
        let groups = build_groups(&rows, &no_choices(), NestingPolicy::SingleSlot);
        let group_names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(group_names, vec!["default", "g1"]);
        assert_eq!(groups[0].label.default_text(), Some("Default Group"));
        assert_eq!(names(&groups[0]), vec!["a", "b", "d"]);
        assert_eq!(names(&groups[1]), vec!["c"]);
    }

    #[test]
    fn test_explicit_default_group_absorbs_ungrouped() {
        let rows = survey(vec![
            json!({ "type": "begin_group", "name": "default", "label": "Intro" }),
            json!({ "type": "text", "name": "a" }),
            json!({ "type": "end_group" }),
            json!({ "type": "text", "name": "b" }),
            json!({ "type": "begin_group", "name": "g", "label": "G" }),
            json!({ "type": "end_group" }),
            json!({ "type": "begin_group", "name": "g", "label": "G again" }),
            json!({ "type": "end_group" }),
        ]);
        let groups = build_groups(&rows, &no_choices(), NestingPolicy::SingleSlot);
        let group_names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(group_names, vec!["default", "g"]);
        assert_eq!(groups[0].label.default_text(), Some("Intro"));
        assert_eq!(names(&groups[0]), vec!["a", "b"]);
    }

    #[test]
    fn test_explicit_default_after_ungrouped_merged() {
        let rows = survey(vec![
            json!({ "type": "text", "name": "a" }),
            json!({ "type": "begin_group", "name": "default", "label": "Later" }),
            json!({ "type": "text", "name": "b" }),
            json!({ "type": "end_group" }),
        ]);
        let groups = build_groups(&rows, &no_choices(), NestingPolicy::SingleSlot);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label.default_text(), Some("Default Group"));
        assert_eq!(names(&groups[0]), vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_group_names_merged() {
        let rows = survey(vec![
            json!({ "type": "begin_group", "name": "hh", "label": "Household", "appearance": "field-list" }),
            json!({ "type": "text", "name": "a" }),
            json!({ "type": "end_group" }),
            json!({ "type": "begin_group", "name": "other", "label": "Other" }),
            json!({ "type": "end_group" }),
            json!({ "type": "begin_group", "name": "hh", "label": "Household 2" }),
            json!({ "type": "text", "name": "b" }),
            json!({ "type": "end_group" }),
        ]);
        for policy in [NestingPolicy::SingleSlot, NestingPolicy::Stack] {
            let groups = build_groups(&rows, &no_choices(), policy);
            let group_names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
            assert_eq!(group_names, vec!["hh", "other"]);
            assert_eq!(groups[0].label.default_text(), Some("Household"));
            assert_eq!(groups[0].appearance.as_deref(), Some("field-list"));
            assert_eq!(names(&groups[0]), vec!["a", "b"]);
        }
    }

    #[test]
    fn test_nesting_policy_names_match_cli() {
        use clap::ValueEnum;

        assert_eq!(serde_json::to_value(NestingPolicy::SingleSlot).unwrap(), json!("single"));
        assert_eq!(serde_json::to_value(NestingPolicy::Stack).unwrap(), json!("stack"));
        for policy in NestingPolicy::value_variants() {
            let cli_name = policy.to_possible_value().unwrap().get_name().to_string();
            assert_eq!(serde_json::to_value(policy).unwrap(), json!(cli_name));
            assert_eq!(NestingPolicy::from_str(&cli_name, true), Ok(*policy));
        }
    }

    #[test]
    fn test_second_begin_discards_open_group() {
        let rows = survey(vec![
            json!({ "type": "begin_group", "name": "g1", "label": "G1" }),
            json!({ "type": "text", "name": "lost" }),
            json!({ "type": "begin_group", "name": "g2", "label": "G2" }),
            json!({ "type": "text", "name": "kept" }),
            json!({ "type": "end_group" }),
            json!({ "type": "end_group" }),
        ]);
        let groups = build_groups(&rows, &no_choices(), NestingPolicy::SingleSlot);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "g2");
        assert_eq!(names(&groups[0]), vec!["kept"]);
    }

    #[test]
    fn test_stack_policy_keeps_outer_group() {
        let rows = survey(vec![
            json!({ "type": "begin_group", "name": "outer", "label": "Outer" }),
            json!({ "type": "text", "name": "a" }),
            json!({ "type": "begin_group", "name": "inner", "label": "Inner" }),
            json!({ "type": "text", "name": "b" }),
            json!({ "type": "end_group" }),
            json!({ "type": "text", "name": "c" }),
            json!({ "type": "end_group" }),
        ]);
        let groups = build_groups(&rows, &no_choices(), NestingPolicy::Stack);
        let group_names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(group_names, vec!["inner", "outer"]);
        assert_eq!(names(&groups[0]), vec!["b"]);
        assert_eq!(names(&groups[1]), vec!["a", "c"]);
    }

    #[test]
    fn test_unclosed_group_dropped() {
        let rows = survey(vec![
            json!({ "type": "text", "name": "a" }),
            json!({ "type": "begin_group", "name": "g1", "label": "G1" }),
            json!({ "type": "text", "name": "b" }),
        ]);
        for policy in [NestingPolicy::SingleSlot, NestingPolicy::Stack] {
            let groups = build_groups(&rows, &no_choices(), policy);
            assert_eq!(groups.len(), 1);
            assert_eq!(groups[0].name, "default");
            assert_eq!(names(&groups[0]), vec!["a"]);
        }
    }

    #[test]
    fn test_unmatched_end_group_ignored() {
        let rows = survey(vec![
            json!({ "type": "end_group" }),
            json!({ "type": "text", "name": "a" }),
            json!({ "type": "end_group" }),
        ]);
        let groups = build_groups(&rows, &no_choices(), NestingPolicy::SingleSlot);
        assert_eq!(groups.len(), 1);
        assert_eq!(names(&groups[0]), vec!["a"]);
    }

    #[test]
    fn test_rows_without_type_skipped() {
        let rows = survey(vec![
            json!({ "name": "orphan", "label": "No type" }),
            json!({ "type": "text", "name": "a" }),
        ]);
        let groups = build_groups(&rows, &no_choices(), NestingPolicy::SingleSlot);
        assert_eq!(names(&groups[0]), vec!["a"]);
    }
}
