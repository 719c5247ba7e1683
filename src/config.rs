use crate::data::{Group, SolverOptions, Subject, Teacher, TimetableInput};
use crate::error::ConfigurationError;
use log::{info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Reads a JSON timetable description and validates it.
pub fn load_input(path: &Path) -> Result<TimetableInput, ConfigurationError> {
    let raw = fs::read_to_string(path)?;
    let input: TimetableInput = serde_json::from_str(&raw)?;
    validate(&input)?;
    info!(
        "Loaded {} groups, {} subjects and {} teachers from {}",
        input.groups.len(),
        input.subjects.len(),
        input.teachers.len(),
        path.display()
    );
    Ok(input)
}

/// Two first-year groups sharing a Maths and an English teacher.
pub fn demo_input() -> TimetableInput {
    TimetableInput {
        num_days: 5,
        num_hours: 5,
        groups: vec![
            Group::new("1-A").in_course("1"),
            Group::new("1-B").in_course("1"),
        ],
        subjects: vec![
            Subject::new("Maths", 10, 2).in_course("1"),
            Subject::new("English", 10, 2).in_course("1"),
        ],
        teachers: vec![
            Teacher::new("John", 20, &["Maths"]),
            Teacher::new("Jane", 20, &["English"]),
        ],
        solver: SolverOptions::default(),
    }
}

/// Checks grid dimensions, uniqueness and referential integrity.
pub fn validate(input: &TimetableInput) -> Result<(), ConfigurationError> {
    if input.num_days == 0 {
        return Err(ConfigurationError::ZeroDays);
    }
    if input.num_hours == 0 {
        return Err(ConfigurationError::ZeroHours);
    }
    if input.groups.is_empty() {
        return Err(ConfigurationError::NoGroups);
    }

    let mut group_ids = HashSet::new();
    for group in &input.groups {
        if group.id.is_empty() {
            return Err(ConfigurationError::EmptyGroupId);
        }
        if !group_ids.insert(group.id.as_str()) {
            return Err(ConfigurationError::DuplicateGroup(group.id.clone()));
        }
    }

    let mut subject_names = HashSet::new();
    for subject in &input.subjects {
        if !subject_names.insert(subject.name.as_str()) {
            return Err(ConfigurationError::DuplicateSubject(subject.name.clone()));
        }
        if subject.max_hours_per_day == 0 {
            return Err(ConfigurationError::ZeroMaxHoursPerDay(subject.name.clone()));
        }
        if !input.groups.iter().any(|g| subject.applies_to(g)) {
            warn!("Subject '{}' applies to no declared group", subject.name);
        }
    }

    let mut teacher_names = HashSet::new();
    for teacher in &input.teachers {
        if !teacher_names.insert(teacher.name.as_str()) {
            return Err(ConfigurationError::DuplicateTeacher(teacher.name.clone()));
        }
        if let Some(unknown) = teacher
            .subjects
            .iter()
            .find(|s| !subject_names.contains(s.as_str()))
        {
            return Err(ConfigurationError::UnknownSubject {
                teacher: teacher.name.clone(),
                subject: unknown.clone(),
            });
        }
    }

    if let Some(limit) = input.solver.time_limit_secs {
        if !limit.is_finite() || limit <= 0.0 {
            return Err(ConfigurationError::InvalidTimeLimit(limit));
        }
    }
    if input.solver.random_seed < 0 {
        return Err(ConfigurationError::InvalidSeed(input.solver.random_seed));
    }
    if input.solver.threads < 1 {
        return Err(ConfigurationError::InvalidThreads(input.solver.threads));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_demo_input_is_valid() {
        assert!(validate(&demo_input()).is_ok());
    }

    #[test]
    fn test_unknown_subject_is_rejected() {
        let mut input = demo_input();
        input.teachers.push(Teacher::new("Ann", 10, &["History"]));
        match validate(&input) {
            Err(ConfigurationError::UnknownSubject { teacher, subject }) => {
                assert_eq!(teacher, "Ann");
                assert_eq!(subject, "History");
            }
            other => panic!("expected UnknownSubject, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_grid_is_rejected() {
        let mut input = demo_input();
        input.num_days = 0;
        assert!(matches!(validate(&input), Err(ConfigurationError::ZeroDays)));

        let mut input = demo_input();
        input.num_hours = 0;
        assert!(matches!(validate(&input), Err(ConfigurationError::ZeroHours)));
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let mut input = demo_input();
        input.groups.push(Group::new("1-A"));
        assert!(matches!(validate(&input), Err(ConfigurationError::DuplicateGroup(id)) if id == "1-A"));

        let mut input = demo_input();
        input.subjects.push(Subject::new("Maths", 1, 1));
        assert!(matches!(validate(&input), Err(ConfigurationError::DuplicateSubject(_))));

        let mut input = demo_input();
        input.teachers.push(Teacher::new("Jane", 1, &[]));
        assert!(matches!(validate(&input), Err(ConfigurationError::DuplicateTeacher(_))));
    }

    #[test]
    fn test_field_ranges_are_checked() {
        let mut input = demo_input();
        input.groups.clear();
        assert!(matches!(validate(&input), Err(ConfigurationError::NoGroups)));

        let mut input = demo_input();
        input.subjects[0].max_hours_per_day = 0;
        assert!(matches!(validate(&input), Err(ConfigurationError::ZeroMaxHoursPerDay(_))));

        let mut input = demo_input();
        input.solver.time_limit_secs = Some(-1.0);
        assert!(matches!(validate(&input), Err(ConfigurationError::InvalidTimeLimit(_))));

        let mut input = demo_input();
        input.solver.random_seed = -1;
        assert!(matches!(validate(&input), Err(ConfigurationError::InvalidSeed(-1))));

        let mut input = demo_input();
        input.solver.random_seed = 0;
        assert!(validate(&input).is_ok());

        let mut input = demo_input();
        input.solver.threads = 0;
        assert!(matches!(validate(&input), Err(ConfigurationError::InvalidThreads(0))));
    }

    #[test]
    fn test_error_message_names_the_field() {
        let mut input = demo_input();
        input.teachers[0].subjects.push("Latin".into());
        let message = validate(&input).unwrap_err().to_string();
        assert_eq!(message, "teacher 'John' references undeclared subject 'Latin'");
    }

    #[test]
    fn test_load_input_reads_json_file() {
        let path = std::env::temp_dir().join(format!("timetable-{}.json", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "numDays": 5, "numHours": 6,
                "groups": [{{"id": "A"}}],
                "subjects": [{{"name": "Maths", "weeklyHours": 5, "maxHoursPerDay": 2}}],
                "teachers": [{{"name": "John", "maxHoursWeek": 5, "subjects": ["Maths"]}}],
                "solver": {{"timeLimitSecs": 10.0, "randomSeed": 7}}
            }}"#
        )
        .unwrap();

        let input = load_input(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(input.num_hours, 6);
        assert_eq!(input.solver.time_limit_secs, Some(10.0));
        assert_eq!(input.solver.random_seed, 7);
        assert_eq!(input.solver.threads, 1);
    }

    #[test]
    fn test_load_input_rejects_negative_hours() {
        let path = std::env::temp_dir().join(format!("timetable-neg-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{"numDays": 5, "numHours": 6, "groups": [{"id": "A"}],
                "subjects": [{"name": "Maths", "weeklyHours": -5}], "teachers": []}"#,
        )
        .unwrap();

        let result = load_input(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigurationError::Parse(_))));
    }

    #[test]
    fn test_load_input_missing_file() {
        let result = load_input(Path::new("/nonexistent/timetable.json"));
        assert!(matches!(result, Err(ConfigurationError::Io(_))));
    }
}
