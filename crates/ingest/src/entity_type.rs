use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity types the linker accepts as targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntityType {
    #[serde(rename = "disease")]
    Disease,
    #[serde(rename = "chemical")]
    Chemical,
    #[serde(rename = "gene")]
    Gene,
    #[serde(rename = "organism")]
    Organism,
    #[serde(rename = "bioprocess")]
    Bioprocess,
    #[serde(rename = "anatomical")]
    Anatomical,
    #[serde(rename = "cell_component")]
    CellComponent,
    #[serde(rename = "cell_line")]
    CellLine,
    #[serde(rename = "cell_type")]
    CellType,
    #[serde(rename = "variant")]
    Variant,
    #[serde(rename = "NILDis")]
    NilDisease,
    #[serde(rename = "NILChem")]
    NilChemical,
    #[serde(rename = "NILGene")]
    NilGene,
}

impl EntityType {
    pub const ALL: [EntityType; 13] = [
        EntityType::Disease,
        EntityType::Chemical,
        EntityType::Gene,
        EntityType::Organism,
        EntityType::Bioprocess,
        EntityType::Anatomical,
        EntityType::CellComponent,
        EntityType::CellLine,
        EntityType::CellType,
        EntityType::Variant,
        EntityType::NilDisease,
        EntityType::NilChemical,
        EntityType::NilGene,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Disease => "disease",
            EntityType::Chemical => "chemical",
            EntityType::Gene => "gene",
            EntityType::Organism => "organism",
            EntityType::Bioprocess => "bioprocess",
            EntityType::Anatomical => "anatomical",
            EntityType::CellComponent => "cell_component",
            EntityType::CellLine => "cell_line",
            EntityType::CellType => "cell_type",
            EntityType::Variant => "variant",
            EntityType::NilDisease => "NILDis",
            EntityType::NilChemical => "NILChem",
            EntityType::NilGene => "NILGene",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        EntityType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| {
                let options: Vec<&str> = EntityType::ALL.iter().map(|t| t.as_str()).collect();
                anyhow::anyhow!(
                    "{} is an invalid entity type! Options: {}",
                    s,
                    options.join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_types() {
        assert_eq!("disease".parse::<EntityType>().unwrap(), EntityType::Disease);
        assert_eq!("NILChem".parse::<EntityType>().unwrap(), EntityType::NilChemical);
        assert_eq!(EntityType::CellLine.to_string(), "cell_line");
    }

    #[test]
    fn test_reject_unknown_type() {
        let err = "protein".parse::<EntityType>().unwrap_err();
        assert!(err.to_string().contains("invalid entity type"));
    }
}
