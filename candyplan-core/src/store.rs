//! Table loading and the session-scoped table store.
//!
//! A [`TableStore`] owns both parsed tables plus the configuration used to
//! derive them. It is built once and only read afterwards, so one store can
//! serve any number of simulations.

use std::borrow::Cow;
use std::convert::Infallible;
use std::sync::OnceLock;

use crate::config::CalcConfig;
use crate::error::CalcError;
use crate::exp_table::LevelRequirementTable;
use crate::shard_table::ShardCostTable;
use crate::simulator::ProgressionSimulator;
use crate::table_text::LevelColumn;

const EMBEDDED_EXP_TABLE: &str = include_str!("../data/exp_table.txt");
const EMBEDDED_SHARD_TABLE: &str = include_str!("../data/shard_table.txt");

/// Trait for abstracting where table text comes from
/// Platform-specific callers provide their own implementation
pub trait TableSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Text of the level-requirement table.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be read.
    fn exp_table(&self) -> Result<Cow<'_, str>, Self::Error>;

    /// Text of the shard-cost table.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be read.
    fn shard_table(&self) -> Result<Cow<'_, str>, Self::Error>;
}

/// Tables compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedTables;

impl TableSource for EmbeddedTables {
    type Error = Infallible;

    fn exp_table(&self) -> Result<Cow<'_, str>, Self::Error> {
        Ok(Cow::Borrowed(EMBEDDED_EXP_TABLE))
    }

    fn shard_table(&self) -> Result<Cow<'_, str>, Self::Error> {
        Ok(Cow::Borrowed(EMBEDDED_SHARD_TABLE))
    }
}

/// Tables held as owned text, e.g. read from files by a caller.
#[derive(Debug, Clone, Default)]
pub struct TextTables {
    pub exp: String,
    pub shard: String,
}

impl TextTables {
    #[must_use]
    pub fn new(exp: impl Into<String>, shard: impl Into<String>) -> Self {
        Self {
            exp: exp.into(),
            shard: shard.into(),
        }
    }
}

impl TableSource for TextTables {
    type Error = Infallible;

    fn exp_table(&self) -> Result<Cow<'_, str>, Self::Error> {
        Ok(Cow::Borrowed(&self.exp))
    }

    fn shard_table(&self) -> Result<Cow<'_, str>, Self::Error> {
        Ok(Cow::Borrowed(&self.shard))
    }
}

/// Parsed, derived and read-only tables for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStore {
    requirements: LevelRequirementTable,
    shards: ShardCostTable,
    config: CalcConfig,
}

impl TableStore {
    /// Parse both texts and derive the accelerated tracks.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a table fails to parse.
    pub fn from_texts(exp: &str, shard: &str, config: CalcConfig) -> Result<Self, CalcError> {
        config.validate()?;
        let exp_column = LevelColumn::parse("exp", exp)?;
        let shard_column = LevelColumn::parse("shard", shard)?;
        let requirements = LevelRequirementTable::build(&exp_column, config.track_multipliers)?;
        log::debug!(
            "loaded tables: {} exp rows, {} shard rows",
            exp_column.len(),
            shard_column.len()
        );
        Ok(Self {
            requirements,
            shards: ShardCostTable::new(shard_column),
            config,
        })
    }

    /// Read both tables from `source` and build a store.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::Source`] if the source fails, or any parse error.
    pub fn load<S: TableSource>(source: &S, config: CalcConfig) -> Result<Self, CalcError> {
        let exp = source
            .exp_table()
            .map_err(|err| CalcError::Source(err.to_string()))?;
        let shard = source
            .shard_table()
            .map_err(|err| CalcError::Source(err.to_string()))?;
        Self::from_texts(&exp, &shard, config)
    }

    /// Process-wide store built from the compiled-in tables and defaults.
    ///
    /// # Errors
    ///
    /// Returns the build error if the embedded tables fail to parse.
    pub fn embedded() -> Result<&'static Self, CalcError> {
        static EMBEDDED: OnceLock<Result<TableStore, CalcError>> = OnceLock::new();
        EMBEDDED
            .get_or_init(|| Self::load(&EmbeddedTables, CalcConfig::default()))
            .as_ref()
            .map_err(Clone::clone)
    }

    #[must_use]
    pub const fn requirements(&self) -> &LevelRequirementTable {
        &self.requirements
    }

    #[must_use]
    pub const fn shards(&self) -> &ShardCostTable {
        &self.shards
    }

    #[must_use]
    pub const fn config(&self) -> &CalcConfig {
        &self.config
    }

    #[must_use]
    pub const fn simulator(&self) -> ProgressionSimulator<'_> {
        ProgressionSimulator::new(
            &self.requirements,
            &self.shards,
            self.config.yield_policy(),
            self.config.boost_shard_multipliers,
        )
    }
}

#[cfg(feature = "async")]
pub use async_cache::AsyncTableCache;

#[cfg(feature = "async")]
mod async_cache {
    use std::future::Future;
    use std::sync::Arc;

    use tokio::sync::OnceCell;

    use super::TableStore;
    use crate::error::CalcError;

    /// Load-once cache for tables fetched asynchronously.
    ///
    /// Concurrent callers wait on the single in-flight load. A failed load
    /// leaves the cache empty so a later call can retry.
    #[derive(Debug, Default)]
    pub struct AsyncTableCache {
        cell: OnceCell<Arc<TableStore>>,
    }

    impl AsyncTableCache {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Return the cached store, running `load` only if nothing is cached.
        ///
        /// # Errors
        ///
        /// Returns the error produced by `load`.
        pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<Arc<TableStore>, CalcError>
        where
            F: FnOnce() -> Fut,
            Fut: Future<Output = Result<TableStore, CalcError>>,
        {
            let store = self
                .cell
                .get_or_try_init(|| async move { load().await.map(Arc::new) })
                .await?;
            Ok(Arc::clone(store))
        }

        #[must_use]
        pub fn get(&self) -> Option<Arc<TableStore>> {
            self.cell.get().cloned()
        }

        #[must_use]
        pub fn is_loaded(&self) -> bool {
            self.cell.initialized()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableParseError;
    use crate::exp_table::Track;
    use crate::simulator::ProgressionRequest;

    #[derive(Debug, thiserror::Error)]
    #[error("offline")]
    struct Offline;

    struct BrokenSource;

    impl TableSource for BrokenSource {
        type Error = Offline;

        fn exp_table(&self) -> Result<Cow<'_, str>, Self::Error> {
            Err(Offline)
        }

        fn shard_table(&self) -> Result<Cow<'_, str>, Self::Error> {
            Ok(Cow::Borrowed(""))
        }
    }

    #[test]
    fn oversized_rows_fail_to_load() {
        let huge = "2 18,000,000,000,000,000,000\n3 18,000,000,000,000,000,000\n";
        assert_eq!(
            TableStore::from_texts(huge, "", CalcConfig::default()),
            Err(CalcError::Table(TableParseError::ValueOutOfRange {
                table: "exp",
                level: 2,
                value: 18_000_000_000_000_000_000,
            }))
        );
    }

    #[test]
    fn embedded_tables_cover_every_level() {
        let store = TableStore::embedded().unwrap();
        for track in Track::ALL {
            store.requirements().ensure_span(1, 65, track).unwrap();
        }
        assert_eq!(store.requirements().requirement(2, Track::Normal).unwrap(), 54);
        assert_eq!(store.requirements().requirement(50, Track::Normal).unwrap(), 1_124);
        assert_eq!(store.shards().shard_cost(2), 14);
        assert!(store.shards().gaps(1, 65).is_empty());
    }

    #[test]
    fn embedded_store_is_shared() {
        let first = TableStore::embedded().unwrap();
        let second = TableStore::embedded().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn embedded_extra_columns_agree_with_derivation() {
        // The data file lists derived columns for reference; they must match.
        let store = TableStore::embedded().unwrap();
        let row = EMBEDDED_EXP_TABLE
            .lines()
            .find(|line| line.starts_with("65 "))
            .unwrap();
        let fields: Vec<u64> = row
            .split_whitespace()
            .map(|f| crate::table_text::parse_grouped(f).unwrap())
            .collect();
        let reqs = store.requirements();
        assert_eq!(fields[2], reqs.requirement(65, Track::PseudoLegendary).unwrap());
        assert_eq!(fields[3], reqs.requirement(65, Track::SemiLegendary).unwrap());
        assert_eq!(fields[4], reqs.requirement(65, Track::Legendary).unwrap());
    }

    #[test]
    fn source_errors_are_reported() {
        let err = TableStore::load(&BrokenSource, CalcConfig::default()).unwrap_err();
        assert_eq!(err, CalcError::Source("offline".to_string()));
    }

    #[test]
    fn text_tables_build_a_working_store() {
        let source = TextTables::new("2 54\n3 71\n", "2 14\n3 18\n");
        let store = TableStore::load(&source, CalcConfig::default()).unwrap();
        let result = store
            .simulator()
            .simulate(&ProgressionRequest::new(1, 3))
            .unwrap();
        assert_eq!(result.candies_total, 4);
    }

    #[test]
    fn invalid_config_blocks_loading() {
        let mut config = CalcConfig::default();
        config.boost_exp_multiplier = 0;
        assert!(matches!(
            TableStore::from_texts("2 54\n", "2 14\n", config),
            Err(CalcError::Config(_))
        ));
    }
}
