use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Cluster id carried by a posting that has not been (or could not be) clustered.
pub const UNCLUSTERED: i64 = -1;

/// A canonical skill with its accumulated section weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedSkill {
    pub skill: String,
    pub weight: f64,
}

/// A job posting as consumed from the posting source and annotated by the pipeline.
///
/// Fields the pipeline does not know about are kept in `extra` and re-emitted
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    #[serde(alias = "job_id", default, deserialize_with = "de_identifier")]
    pub id: String,
    #[serde(default, deserialize_with = "de_nullable_string")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaned_text: Option<String>,
    /// Canonical skills, highest weight first.
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub skills_weighted: Vec<WeightedSkill>,
    #[serde(default = "unclustered")]
    pub cluster: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn unclustered() -> i64 {
    UNCLUSTERED
}

impl Posting {
    pub fn new(id: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: Some(description.into()),
            cleaned_text: None,
            skills: Vec::new(),
            skills_weighted: Vec::new(),
            cluster: UNCLUSTERED,
            extra: Map::new(),
        }
    }

    /// Builds a posting that already carries extracted skills (weight 1.0 each).
    pub fn with_skills(id: impl Into<String>, title: impl Into<String>, skills: &[&str]) -> Self {
        let mut posting = Self::new(id, title, "");
        posting.set_skills(
            skills
                .iter()
                .map(|s| WeightedSkill {
                    skill: s.to_string(),
                    weight: 1.0,
                })
                .collect(),
        );
        posting
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Replaces the skill annotations, keeping `skills` in step with `skills_weighted`.
    pub fn set_skills(&mut self, weighted: Vec<WeightedSkill>) {
        self.skills = weighted.iter().map(|w| w.skill.clone()).collect();
        self.skills_weighted = weighted;
    }
}

/// Accepts string or integer identifiers; null/missing become empty.
fn de_identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "identifier must be a string or number, got {other}"
        ))),
    }
}

fn de_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_posting_deserializes_minimal_record() {
        let posting: Posting = serde_json::from_value(json!({
            "id": "p-1",
            "title": "Data Engineer",
            "description": "Spark and SQL"
        }))
        .unwrap();
        assert_eq!(posting.id, "p-1");
        assert_eq!(posting.cluster, UNCLUSTERED);
        assert!(posting.skills.is_empty());
    }

    #[test]
    fn test_numeric_job_id_accepted() {
        let posting: Posting =
            serde_json::from_value(json!({"job_id": 42, "title": "Dev"})).unwrap();
        assert_eq!(posting.id, "42");
        assert!(posting.description.is_none());
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let posting: Posting = serde_json::from_value(json!({
            "id": "p-2",
            "title": "SRE",
            "company": "Acme",
            "location": "Casablanca"
        }))
        .unwrap();
        assert_eq!(posting.extra.get("company"), Some(&json!("Acme")));

        let value = serde_json::to_value(&posting).unwrap();
        assert_eq!(value["location"], json!("Casablanca"));
        assert_eq!(value["cluster"], json!(-1));
    }

    #[test]
    fn test_null_title_becomes_empty() {
        let posting: Posting = serde_json::from_value(json!({"id": "x", "title": null})).unwrap();
        assert_eq!(posting.title, "");
    }

    #[test]
    fn test_object_identifier_rejected() {
        let result: Result<Posting, _> = serde_json::from_value(json!({"id": {"a": 1}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_set_skills_keeps_lists_in_step() {
        let posting = Posting::with_skills("p", "t", &["python", "sql"]);
        assert_eq!(posting.skills, vec!["python", "sql"]);
        assert_eq!(posting.skills_weighted.len(), 2);
    }
}
