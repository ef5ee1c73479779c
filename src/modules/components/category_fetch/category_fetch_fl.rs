use log::{debug, warn};

use crate::error::{CategoryError, ProviderError};
use crate::modules::api::models::{Category, GameContext, RawAsset};
use crate::modules::api::stats_client_fl::StatsProvider;

/// Fetch one category's clips and check them against the box score.
///
/// Assets with no playable URL are dropped before counting. The surviving count
/// must equal `game.total(category)`; anything else means the provider handed
/// back an inconsistent dataset.
pub async fn fetch_category<P: StatsProvider>(
    provider: &P,
    game: &GameContext,
    category: Category,
) -> Result<Vec<RawAsset>, CategoryError> {
    let raw = provider
        .fetch_category_assets(game, category)
        .await
        .map_err(|e| match e {
            ProviderError::Malformed { detail, .. } => {
                CategoryError::MalformedResponse { category, detail }
            }
            other => CategoryError::Provider {
                category,
                source: other,
            },
        })?;

    let listed = raw.len();
    let assets: Vec<RawAsset> = raw.into_iter().filter(RawAsset::is_playable).collect();
    if assets.len() != listed {
        debug!(
            "{}: dropped {} clip(s) without a playable url",
            category,
            listed - assets.len()
        );
    }

    let expected = game.total(category);
    if assets.len() != expected as usize {
        warn!(
            "{}: box score says {}, provider returned {} playable clip(s)",
            category,
            expected,
            assets.len()
        );
        return Err(CategoryError::CountMismatch {
            category,
            expected,
            actual: assets.len(),
        });
    }

    Ok(assets)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::modules::api::models::StatLine;

    enum Canned {
        Assets(Vec<RawAsset>),
        HtmlPage,
        LengthMismatch,
    }

    impl StatsProvider for Canned {
        async fn fetch_category_assets(
            &self,
            _game: &GameContext,
            _category: Category,
        ) -> Result<Vec<RawAsset>, ProviderError> {
            match self {
                Canned::Assets(assets) => Ok(assets.clone()),
                Canned::HtmlPage => Err(ProviderError::Malformed {
                    endpoint: "videodetailsasset".into(),
                    detail: "received html response, expected json".into(),
                }),
                Canned::LengthMismatch => Err(ProviderError::Inconsistent {
                    endpoint: "videodetailsasset".into(),
                    detail: "1 playlist entries but 0 url entries".into(),
                }),
            }
        }

        async fn fetch_game_context(
            &self,
            player_id: u64,
            _game_id: Option<&str>,
        ) -> Result<GameContext, ProviderError> {
            Err(ProviderError::GameNotFound {
                player_id,
                game_id: None,
            })
        }
    }

    fn game(blocks: u32) -> GameContext {
        GameContext {
            game_id: "0022400001".into(),
            player_id: 1,
            team_id: 2,
            player_name: "Test Player".into(),
            team_name: "Testers".into(),
            matchup: "TST vs. OPP".into(),
            game_date: NaiveDate::from_ymd_opt(2024, 10, 22).unwrap(),
            totals: BTreeMap::from([(Category::Blocks, blocks)]),
            line: StatLine::default(),
        }
    }

    fn clip(small: Option<&str>) -> RawAsset {
        RawAsset {
            description: "block".into(),
            small_url: small.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn unplayable_assets_are_dropped_before_counting() {
        let provider = Canned::Assets(vec![
            clip(Some("https://x/1.mp4")),
            clip(None),
            clip(Some("")),
            clip(Some("https://x/2.mp4")),
        ]);
        let assets = fetch_category(&provider, &game(2), Category::Blocks)
            .await
            .unwrap();
        assert_eq!(assets.len(), 2);
    }

    #[tokio::test]
    async fn count_mismatch_reports_expected_and_actual() {
        let provider = Canned::Assets(vec![clip(Some("https://x/1.mp4"))]);
        let err = fetch_category(&provider, &game(2), Category::Blocks)
            .await
            .unwrap_err();
        match err {
            CategoryError::CountMismatch {
                category,
                expected,
                actual,
            } => {
                assert_eq!(category, Category::Blocks);
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_provider_response_keeps_its_own_kind() {
        let provider = Canned::HtmlPage;
        let err = fetch_category(&provider, &game(1), Category::Blocks)
            .await
            .unwrap_err();
        assert!(matches!(err, CategoryError::MalformedResponse { .. }));
        assert!(err.to_string().contains("html"));
    }

    #[tokio::test]
    async fn other_provider_failures_are_wrapped() {
        let provider = Canned::LengthMismatch;
        let err = fetch_category(&provider, &game(1), Category::Blocks)
            .await
            .unwrap_err();
        assert!(matches!(err, CategoryError::Provider { .. }));
    }
}
