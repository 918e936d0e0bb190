use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Employment type, inferred from the listing text when the source
/// does not state it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Freelance,
    Internship,
    #[default]
    Unknown,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Freelance => "Freelance",
            JobType::Internship => "Internship",
            JobType::Unknown => "Unknown",
        }
    }

    /// Keyword classification over title and description.
    ///
    /// Checked most-specific first: an "internship" that also mentions
    /// "full-time" hours is still an internship. "Smart contract" is domain
    /// vocabulary, not an engagement type.
    pub fn classify(title: &str, description: &str) -> Self {
        let text = format!("{} {}", title, description)
            .to_lowercase()
            .replace("smart contract", "");
        let mentions = |needles: &[&str]| needles.iter().any(|n| text.contains(n));
        let has_word = |word: &str| {
            text.split(|c: char| !c.is_alphanumeric())
                .any(|w| w == word)
        };

        if mentions(&["internship"]) || has_word("intern") || has_word("interns") {
            JobType::Internship
        } else if mentions(&["freelance"]) {
            JobType::Freelance
        } else if mentions(&["contract", "contractor"]) {
            JobType::Contract
        } else if mentions(&["part-time", "part time", "parttime"]) {
            JobType::PartTime
        } else if mentions(&["full-time", "full time", "fulltime", "permanent"]) {
            JobType::FullTime
        } else {
            JobType::Unknown
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Full-time" => Ok(JobType::FullTime),
            "Part-time" => Ok(JobType::PartTime),
            "Contract" => Ok(JobType::Contract),
            "Freelance" => Ok(JobType::Freelance),
            "Internship" => Ok(JobType::Internship),
            "Unknown" => Ok(JobType::Unknown),
            _ => Err(anyhow::anyhow!("Invalid job type: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_from_title() {
        assert_eq!(
            JobType::classify("Smart Contract Auditor (Contract)", ""),
            JobType::Contract
        );
        assert_eq!(
            JobType::classify("Blockchain Engineering Intern", ""),
            JobType::Internship
        );
        assert_eq!(
            JobType::classify("Solidity Dev", "Full-time, remote friendly"),
            JobType::FullTime
        );
    }

    #[test]
    fn test_classify_defaults_to_unknown() {
        assert_eq!(JobType::classify("Solidity Dev", ""), JobType::Unknown);
        assert_eq!(
            JobType::classify("Senior Smart Contract Engineer", "Write smart contracts"),
            JobType::Unknown
        );
        assert_eq!(
            JobType::classify("Internal Tools Engineer", "International team"),
            JobType::Unknown
        );
    }

    #[test]
    fn test_round_trip_through_column_text() {
        for job_type in [
            JobType::FullTime,
            JobType::PartTime,
            JobType::Contract,
            JobType::Freelance,
            JobType::Internship,
            JobType::Unknown,
        ] {
            assert_eq!(job_type.to_string().parse::<JobType>().unwrap(), job_type);
        }
        assert!("full time".parse::<JobType>().is_err());
    }
}
