use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// record identifier as delivered by the data source: a string or a number
///
/// Equality and hashing go through [`Id::canonical`], so `Id::Number(1)` and
/// `Id::Text("1")` are the same identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(i64),
    /// above `i64::MAX`
    Unsigned(u64),
    /// whole floats such as `1.0` canonicalise like the integer
    Float(f64),
    Text(String),
}

impl Id {
    /// canonical string form used for every comparison
    pub fn canonical(&self) -> String {
        match self {
            Id::Number(n) => n.to_string(),
            Id::Unsigned(n) => n.to_string(),
            Id::Float(f) if *f == 0.0 => "0".to_string(),
            Id::Float(f) => f.to_string(),
            Id::Text(s) => s.trim().to_string(),
        }
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n)
    }
}

impl From<i32> for Id {
    fn from(n: i32) -> Self {
        Id::Number(n as i64)
    }
}

impl From<u32> for Id {
    fn from(n: u32) -> Self {
        Id::Number(n as i64)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::Text(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::Text(s)
    }
}

pub type UserId = Id;
pub type ContractId = Id;

/// mapping entry: either a bare identifier or an object exposing `id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdRef {
    Raw(Id),
    Wrapped { id: Id },
}

impl IdRef {
    pub fn id(&self) -> &Id {
        match self {
            IdRef::Raw(id) => id,
            IdRef::Wrapped { id } => id,
        }
    }

    pub fn canonical(&self) -> String {
        self.id().canonical()
    }
}

impl From<Id> for IdRef {
    fn from(id: Id) -> Self {
        IdRef::Raw(id)
    }
}

/// cash kick draw status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawStatus {
    /// being repaid
    #[serde(alias = "active", alias = "ACTIVE")]
    Active,
    /// fully repaid
    #[serde(alias = "completed", alias = "COMPLETED")]
    Completed,
    /// requested, not yet funded
    #[serde(alias = "pending", alias = "PENDING")]
    Pending,
}

/// status of a scheduled payment relative to a given date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Upcoming,
    Due,
    Overdue,
}

/// upstream fetch a record set comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Contracts,
    Draws,
    Account,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Contracts => "contracts",
            Source::Draws => "draws",
            Source::Account => "account",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_and_text_ids_are_equal() {
        assert_eq!(Id::from(1), Id::from("1"));
        assert_ne!(Id::from(2), Id::from("1"));
        assert_eq!(Id::from(" 7 ").canonical(), "7");
    }

    #[test]
    fn test_wide_and_float_ids() {
        let float: Id = serde_json::from_value(json!(1.0)).unwrap();
        assert!(matches!(float, Id::Float(_)));
        assert_eq!(float, Id::from(1));
        assert_eq!(float, Id::from("1"));

        let fractional: Id = serde_json::from_value(json!(2.5)).unwrap();
        assert_eq!(fractional.canonical(), "2.5");
        assert_ne!(fractional, Id::from(2));

        let wide: Id = serde_json::from_value(json!(u64::MAX)).unwrap();
        assert!(matches!(wide, Id::Unsigned(u64::MAX)));
        assert_eq!(wide, Id::from("18446744073709551615"));

        let contracts: Vec<IdRef> = serde_json::from_value(json!([1.0, { "id": 2.0 }, "3"])).unwrap();
        let keys: Vec<String> = contracts.iter().map(IdRef::canonical).collect();
        assert_eq!(keys, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_id_ref_decoding() {
        let raw: IdRef = serde_json::from_value(json!("1")).unwrap();
        let number: IdRef = serde_json::from_value(json!(1)).unwrap();
        let wrapped: IdRef = serde_json::from_value(json!({ "id": "1", "amount": 1000 })).unwrap();

        assert!(matches!(raw, IdRef::Raw(Id::Text(_))));
        assert!(matches!(number, IdRef::Raw(Id::Number(1))));
        assert!(matches!(wrapped, IdRef::Wrapped { .. }));

        assert_eq!(raw.canonical(), "1");
        assert_eq!(number.canonical(), "1");
        assert_eq!(wrapped.canonical(), "1");
    }

    #[test]
    fn test_draw_status_accepts_lowercase() {
        let status: DrawStatus = serde_json::from_value(json!("active")).unwrap();
        assert_eq!(status, DrawStatus::Active);
        let status: DrawStatus = serde_json::from_value(json!("Pending")).unwrap();
        assert_eq!(status, DrawStatus::Pending);
    }

    #[test]
    fn test_source_display() {
        assert_eq!(Source::Contracts.to_string(), "contracts");
        assert_eq!(serde_json::to_value(Source::Account).unwrap(), json!("account"));
    }
}
