use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VariantError {
    #[error("variant {variant} call {callset} has no GT field")]
    MissingGenotype { variant: String, callset: String },
    #[error("variant {variant} has no alternate allele {allele}")]
    UnknownAllele { variant: String, allele: String },
}

/// A variant record as delivered by a variant backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariant {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub names: Vec<String>,
    pub position: u64,
    #[serde(default)]
    pub reference_bases: String,
    #[serde(default)]
    pub alternate_bases: Vec<String>,
    #[serde(default)]
    pub calls: Vec<RawCall>,
}

/// One callset's call at a variant.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCall {
    #[serde(default, rename = "callsetId", alias = "callSetId")]
    pub callset_id: String,
    #[serde(default, rename = "callsetName", alias = "callSetName")]
    pub callset_name: String,
    #[serde(default)]
    pub info: HashMap<String, Vec<String>>,
}

/// One page of a paginated variant response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantPage {
    #[serde(default)]
    pub variants: Vec<RawVariant>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl VariantPage {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Resolve a call's `GT` field into allele sequences.
///
/// `0` is the reference allele, `n` is alternate allele `n`, and a no-call `.`
/// is kept as `.`.
pub fn genotype(variant: &RawVariant, call: &RawCall) -> Result<Vec<String>, VariantError> {
    let gt = call
        .info
        .get("GT")
        .and_then(|values| values.first())
        .ok_or_else(|| VariantError::MissingGenotype {
            variant: variant.id.clone(),
            callset: call.callset_id.clone(),
        })?;

    gt.split(['|', '/'])
        .map(|allele| {
            if allele == "." {
                return Ok(".".to_string());
            }
            let unknown = || VariantError::UnknownAllele {
                variant: variant.id.clone(),
                allele: allele.to_string(),
            };
            match allele.parse::<usize>().map_err(|_| unknown())? {
                0 => Ok(variant.reference_bases.clone()),
                n => variant.alternate_bases.get(n - 1).cloned().ok_or_else(unknown),
            }
        })
        .collect()
}

/// A variant call positioned for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedCall {
    /// Variant id + callset id.
    pub id: String,
    pub position: u64,
    /// Display lane: the call's index within its variant.
    pub lane: usize,
    /// Alleles joined with `;`.
    pub genotype: String,
    pub callset_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct VariantLayout {
    pub calls: Vec<PositionedCall>,
    /// Largest number of calls on any one variant.
    pub track_count: usize,
}

/// Lay out every call of every variant.
pub fn layout_variants(variants: &[RawVariant]) -> Result<VariantLayout, VariantError> {
    let mut layout = VariantLayout::default();
    for variant in variants {
        layout.track_count = layout.track_count.max(variant.calls.len());
        for (lane, call) in variant.calls.iter().enumerate() {
            layout.calls.push(PositionedCall {
                id: format!("{}{}", variant.id, call.callset_id),
                position: variant.position,
                lane,
                genotype: genotype(variant, call)?.join(";"),
                callset_name: call.callset_name.clone(),
            });
        }
    }
    Ok(layout)
}
