use std::collections::HashMap;

use serde::Serialize;

use super::student::StudentRecord;

/// `"<class>_<crn>"`, e.g. `"GEO 170_12345"`.
pub fn group_key(record: &StudentRecord) -> String {
    format!("{}_{}", record.class_name, record.crn)
}

#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub key: String,
    pub records: Vec<StudentRecord>,
}

/// Partition records by section, keeping first-seen order of groups and
/// scan order within each group.
pub fn group_records(records: &[StudentRecord]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = group_key(record);
        let idx = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(Group {
                key,
                records: Vec::new(),
            });
            groups.len() - 1
        });
        groups[idx].records.push(record.clone());
    }

    groups
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(g: &str, class: &str, crn: &str) -> StudentRecord {
        StudentRecord {
            first_name: String::new(),
            last_name: String::new(),
            g_number: g.into(),
            institutional_email: String::new(),
            personal_email: String::new(),
            class_name: class.into(),
            crn: crn.into(),
        }
    }

    #[test]
    fn groups_by_class_and_crn_in_first_seen_order() {
        let records = vec![
            rec("G00000001", "GEO 221", "33333"),
            rec("G00000002", "GEO 170", "12345"),
            rec("G00000003", "GEO 221", "33333"),
            rec("G00000004", "GEO 170", "12346"),
        ];
        let groups = group_records(&records);
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["GEO 221_33333", "GEO 170_12345", "GEO 170_12346"]);
        let first: Vec<&str> = groups[0].records.iter().map(|r| r.g_number.as_str()).collect();
        assert_eq!(first, vec!["G00000001", "G00000003"]);
    }

    #[test]
    fn partition_keeps_every_record_once() {
        let records = vec![
            rec("G00000001", "GEO 170", "12345"),
            rec("G00000001", "GEO 170", "12345"),
            rec("G00000002", "GEO 240", "40000"),
        ];
        let groups = group_records(&records);
        let total: usize = groups.iter().map(|g| g.records.len()).sum();
        assert_eq!(total, records.len());
        for g in &groups {
            assert!(g.records.iter().all(|r| group_key(r) == g.key));
        }
    }

    #[test]
    fn empty_input() {
        assert!(group_records(&[]).is_empty());
    }
}
