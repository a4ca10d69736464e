//! Line format of the per-document candidate files read by the PPR ranker.
//!
//! ```text
//! ENTITY	text:<mention>	normalName:<lower>	predictedType:<type>	q:true	qid:Q<seq>	docId:<doc>	origText:<mention>	url:unknown
//! CANDIDATE	id:<n>	inCount:<in>	outCount:<out>	links:<n;n>	url:<kb_id>	name:<name>	normalName:<lower>	normalWikiTitle:<lower>	predictedType:<type>
//! ```

use anyhow::{Context, Result};

use candidates::Candidate;
use ingest::Mention;

use crate::document::DocumentCandidateSet;

pub const ENTITY_PREFIX: &str = "ENTITY";
pub const CANDIDATE_PREFIX: &str = "CANDIDATE";

pub fn entity_line(mention: &Mention, entity_type: &str, seq: usize) -> String {
    format!(
        "{}\ttext:{}\tnormalName:{}\tpredictedType:{}\tq:true\tqid:Q{}\tdocId:{}\torigText:{}\turl:unknown\n",
        ENTITY_PREFIX,
        mention.text,
        mention.normalized_text,
        entity_type,
        seq,
        mention.doc_id,
        mention.text,
    )
}

pub fn candidate_line(candidate: &Candidate, entity_type: &str) -> String {
    let links: Vec<String> = candidate.links.iter().map(|id| id.to_string()).collect();
    let normal_name = candidate.name.to_lowercase();

    format!(
        "{}\tid:{}\tinCount:{}\toutCount:{}\tlinks:{}\turl:{}\tname:{}\tnormalName:{}\tnormalWikiTitle:{}\tpredictedType:{}\n",
        CANDIDATE_PREFIX,
        candidate.numeric_id,
        candidate.in_degree,
        candidate.out_degree,
        links.join(";"),
        candidate.kb_id,
        candidate.name,
        normal_name,
        normal_name,
        entity_type,
    )
}

/// Serialize a linked document: each `ENTITY` line followed by its
/// `CANDIDATE` lines.
pub fn render(set: &DocumentCandidateSet) -> String {
    let mut out = String::new();

    for entry in &set.entries {
        out.push_str(&entity_line(&entry.mention, &set.entity_type, set.seq));
        for candidate in &entry.candidates {
            out.push_str(&candidate_line(candidate, &set.entity_type));
        }
    }

    out
}

/// The fields of a `CANDIDATE` line needed after ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    pub numeric_id: i64,
    pub kb_id: String,
    pub name: String,
    pub links: Vec<i64>,
}

/// An `ENTITY` line with the candidates listed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityBlock {
    pub text: String,
    pub candidates: Vec<CandidateRecord>,
}

fn field<'l>(fields: &[&'l str], key: &str) -> Option<&'l str> {
    fields.iter().find_map(|f| f.strip_prefix(key))
}

pub fn parse_candidate_line(line: &str) -> Result<CandidateRecord> {
    let fields: Vec<&str> = line.trim_end_matches('\n').split('\t').collect();

    let numeric_id = field(&fields, "id:")
        .context("Candidate line without id")?
        .parse::<i64>()
        .context("Candidate id is not an integer")?;
    let kb_id = field(&fields, "url:").context("Candidate line without url")?;
    let name = field(&fields, "name:").unwrap_or_default();
    let links = field(&fields, "links:")
        .unwrap_or_default()
        .split(';')
        .filter(|l| !l.is_empty())
        .map(|l| l.parse::<i64>().context("Candidate link is not an integer"))
        .collect::<Result<Vec<i64>>>()?;

    Ok(CandidateRecord {
        numeric_id,
        kb_id: kb_id.to_string(),
        name: name.to_string(),
        links,
    })
}

pub fn parse(content: &str) -> Result<Vec<EntityBlock>> {
    let mut blocks: Vec<EntityBlock> = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        if line.starts_with(ENTITY_PREFIX) {
            let fields: Vec<&str> = line.split('\t').collect();
            let text = field(&fields, "text:")
                .context(format!("Entity line {} without text", line_no + 1))?;
            blocks.push(EntityBlock {
                text: text.to_string(),
                candidates: Vec::new(),
            });
        } else if line.starts_with(CANDIDATE_PREFIX) {
            let record = parse_candidate_line(line)
                .context(format!("Malformed candidate at line {}", line_no + 1))?;
            blocks
                .last_mut()
                .context(format!("Candidate before any entity at line {}", line_no + 1))?
                .candidates
                .push(record);
        }
    }

    Ok(blocks)
}
