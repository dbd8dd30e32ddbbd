//! Routes window changes and paged backend responses into a [`ReadCache`].

use std::collections::HashMap;

use log::{debug, info};

use crate::alignment::decode::{DecodeWarning, DecodedBatch, decode_batch};
use crate::alignment::record::{RawRead, ReadPage};
use crate::cache::ReadCache;
use crate::config::ViewConfig;
use crate::region::Region;
use crate::variant::{RawVariant, VariantError, VariantLayout, VariantPage, layout_variants};
use crate::view::ViewLevel;

/// State for one viewer: the read cache plus the responses of the current query.
#[derive(Debug)]
pub struct ReadSession {
    config: ViewConfig,
    cache: ReadCache,
    region: Option<Region>,
    level: ViewLevel,
    pending_reads: Vec<RawRead>,
    batch: DecodedBatch,
    pending_variants: Vec<RawVariant>,
    variants: VariantLayout,
    notices: Vec<DecodeWarning>,
}

impl ReadSession {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            config,
            cache: ReadCache::new(),
            region: None,
            level: ViewLevel::Summary,
            pending_reads: Vec::new(),
            batch: DecodedBatch::default(),
            pending_variants: Vec::new(),
            variants: VariantLayout::default(),
            notices: Vec::new(),
        }
    }

    pub fn cache(&self) -> &ReadCache {
        &self.cache
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    pub fn level(&self) -> ViewLevel {
        self.level
    }

    /// The most recent full decode of the current query's reads.
    pub fn batch(&self) -> &DecodedBatch {
        &self.batch
    }

    pub fn variants(&self) -> &VariantLayout {
        &self.variants
    }

    /// Move the view. Returns whether reads should be fetched for it.
    ///
    /// Responses for the previous view that are still in flight may keep
    /// arriving; the cache drops whatever no longer overlaps the window.
    pub fn set_view(&mut self, region: Region, level: ViewLevel) -> bool {
        self.cache.set_range(region.start, region.end, level.wants_bases());
        info!("view {region} at {level:?}: {} reads resident", self.cache.len());
        self.region = Some(region);
        self.level = level;
        self.pending_reads.clear();
        self.pending_variants.clear();
        level.wants_reads()
    }

    /// Take in one page of reads. Returns whether more pages are expected.
    ///
    /// The accumulated pages are decoded as one batch; reads not already
    /// resident at the current detail are added to the cache. When a batch
    /// holds the same id twice, the later record wins, even if the earlier one
    /// arrived in a previous page.
    pub fn receive_page(&mut self, page: ReadPage) -> bool {
        let more = page.has_more();
        self.pending_reads.extend(page.reads);
        self.batch = decode_batch(&self.pending_reads);

        for warning in &self.batch.warnings {
            if !self.notices.contains(warning) {
                self.notices.push(warning.clone());
            }
        }

        let mut last_index: HashMap<&str, usize> = HashMap::new();
        for (i, read) in self.batch.reads.iter().enumerate() {
            last_index.insert(read.id.as_str(), i);
        }

        let want_bases = self.cache.want_bases();
        let mut added = 0usize;
        for (i, read) in self.batch.reads.iter().enumerate() {
            if last_index.get(read.id.as_str()) != Some(&i) {
                continue;
            }
            // Already resident from this same record; a later duplicate replaces it.
            let same_record = self
                .cache
                .get(&read.id)
                .is_some_and(|resident| resident.index == read.index);
            if same_record && self.cache.has_read(&read.id, want_bases) {
                continue;
            }
            let read = if want_bases {
                read.clone()
            } else {
                read.clone().into_summary()
            };
            self.cache.add_or_update(read);
            added += 1;
        }
        debug!(
            "page of {} accumulated reads: {added} offered to cache, {} resident",
            self.pending_reads.len(),
            self.cache.len()
        );
        more
    }

    /// Take in one page of variants. Returns whether more pages are expected.
    pub fn receive_variant_page(&mut self, page: VariantPage) -> Result<bool, VariantError> {
        let more = page.next_page_token.as_deref().is_some_and(|t| !t.is_empty());
        self.pending_variants.extend(page.variants);
        self.variants = layout_variants(&self.pending_variants)?;
        Ok(more)
    }

    /// Pileup text at `position` from the current batch.
    pub fn pileup_summary(&self, position: u64) -> String {
        self.batch.base_stats.summary(position)
    }

    /// Alleles supported at `position` in the current batch.
    pub fn alleles(&self, position: u64) -> Option<(u8, u8)> {
        self.batch
            .base_stats
            .alleles(position, self.config.min_allele_fraction)
    }

    pub fn notices(&self) -> &[DecodeWarning] {
        &self.notices
    }

    /// Drain the user-facing notices.
    pub fn take_notices(&mut self) -> Vec<DecodeWarning> {
        std::mem::take(&mut self.notices)
    }

    /// Forget everything, including the cache window.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.region = None;
        self.level = ViewLevel::Summary;
        self.pending_reads.clear();
        self.batch = DecodedBatch::default();
        self.pending_variants.clear();
        self.variants = VariantLayout::default();
        self.notices.clear();
    }
}

impl Default for ReadSession {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}
