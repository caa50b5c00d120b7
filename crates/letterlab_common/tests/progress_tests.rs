//! Letter progress store behaviour against the in-memory backend.

use letterlab_common::progress::{progress_key, HISTORY_CAP};
use letterlab_common::{
    ConfusionScoreOptions, KvStore, LetterPatch, LetterProgress, LetterProgressStore,
    MemoryKvStore, MiniGame, StarField, UnlockState,
};
use std::sync::Arc;

fn store() -> (Arc<MemoryKvStore>, LetterProgressStore) {
    let kv = Arc::new(MemoryKvStore::new());
    let store = LetterProgressStore::new(kv.clone());
    (kv, store)
}

#[tokio::test]
async fn test_fresh_letter_is_all_defaults() {
    let (kv, store) = store();
    let q = store.get("q").await.unwrap();

    assert_eq!(q, LetterProgress::default());
    assert_eq!(q.total_stars(), 0);
    assert_eq!(q.confusion_score, 0);
    assert_eq!(q.time_spent_ms, 0);
    assert_eq!(q.games_unlocked, UnlockState::Locked);
    assert!(q.confusion_history.is_empty());
    // reads never materialize records in storage
    assert!(kv.is_empty().await);
}

#[tokio::test]
async fn test_corrupt_payload_reads_as_defaults() {
    let kv = Arc::new(MemoryKvStore::with_entries([
        ("progress:a", "{not json"),
        ("progress:b", "[1,2,3]"),
        ("progress:c", "7"),
    ]));
    let store = LetterProgressStore::new(kv);

    for id in ["a", "b", "c"] {
        assert_eq!(store.get(id).await.unwrap(), LetterProgress::default());
    }
}

#[tokio::test]
async fn test_ids_are_case_insensitive() {
    let (kv, store) = store();
    store.award_stars("A", StarField::UcStars, 2).await.unwrap();

    assert_eq!(store.get("a").await.unwrap().uc_stars, 2);
    assert!(kv.get(&progress_key("a")).await.unwrap().is_some());
}

#[tokio::test]
async fn test_award_stars_never_decreases_and_clamps() {
    let (_kv, store) = store();

    store.award_stars("m", StarField::DrawStars, 2).await.unwrap();
    store.award_stars("m", StarField::DrawStars, 1).await.unwrap();
    store.award_stars("m", StarField::DrawStars, -5).await.unwrap();
    assert_eq!(store.get("m").await.unwrap().draw_stars, 2);

    store.award_stars("m", StarField::DrawStars, 10).await.unwrap();
    assert_eq!(store.get("m").await.unwrap().draw_stars, 3);

    for stars in [3, 2, 0, 99] {
        let p = store.award_stars("m", StarField::DrawStars, stars).await.unwrap();
        assert_eq!(p.draw_stars, 3);
    }
}

#[tokio::test]
async fn test_award_stars_skips_write_when_not_improving() {
    let (kv, store) = store();
    store.award_stars("k", StarField::LcStars, 3).await.unwrap();

    // a failing backend proves no write is attempted
    kv.set_fail_writes(true);
    let p = store.award_stars("k", StarField::LcStars, 2).await.unwrap();
    assert_eq!(p.lc_stars, 3);

    assert!(store.award_stars("k", StarField::UcStars, 1).await.is_err());
}

#[tokio::test]
async fn test_high_scores_keep_maximum() {
    let (_kv, store) = store();

    let submissions = [12, 40, 7, 40, 39, 55, 0, -3];
    let mut best = 0u64;
    for score in submissions {
        let p = store
            .save_game_high_score("h", MiniGame::Hero, score)
            .await
            .unwrap();
        best = best.max(score.max(0) as u64);
        assert_eq!(p.hero_high_score, best);
    }

    store.save_garden_high_score("h", 9).await.unwrap();
    store.save_garden_high_score("h", 4).await.unwrap();
    let p = store.get("h").await.unwrap();
    assert_eq!(p.garden_high_score, 9);
    assert_eq!(p.high_score(MiniGame::Hero), 55);
    assert_eq!(p.monster_high_score, 0);
}

#[tokio::test]
async fn test_confusion_score_overwrites_and_logs_history() {
    let (_kv, store) = store();
    let opts = ConfusionScoreOptions::default();

    store.set_confusion_score("b", 90.0, opts).await.unwrap();
    let p = store.set_confusion_score("b", 40.0, opts).await.unwrap();

    assert_eq!(p.confusion_score, 40);
    let scores: Vec<u8> = p.confusion_history.iter().map(|h| h.score).collect();
    assert_eq!(scores, vec![90, 40]);
    assert!(p.confusion_history[0].ts <= p.confusion_history[1].ts);
}

#[tokio::test]
async fn test_confusion_history_keeps_newest_fourteen() {
    let (_kv, store) = store();
    for i in 0..20 {
        store
            .set_confusion_score("d", i as f64 * 5.0, ConfusionScoreOptions::default())
            .await
            .unwrap();
    }

    let p = store.get("d").await.unwrap();
    assert_eq!(p.confusion_history.len(), HISTORY_CAP);
    assert_eq!(p.confusion_history.first().map(|h| h.score), Some(30));
    assert_eq!(p.confusion_history.last().map(|h| h.score), Some(95));
    assert_eq!(p.confusion_score, 95);
}

#[tokio::test]
async fn test_confusion_score_clamps_and_can_skip_history() {
    let (_kv, store) = store();
    let quiet = ConfusionScoreOptions {
        append_history: false,
    };

    let p = store.set_confusion_score("e", 180.4, quiet).await.unwrap();
    assert_eq!(p.confusion_score, 100);
    let p = store.set_confusion_score("e", f64::NAN, quiet).await.unwrap();
    assert_eq!(p.confusion_score, 0);
    let p = store.set_confusion_score("e", 79.5, quiet).await.unwrap();
    assert_eq!(p.confusion_score, 80);
    assert!(p.confusion_history.is_empty());
}

#[tokio::test]
async fn test_games_unlock_is_sticky() {
    let (_kv, store) = store();
    for field in [StarField::RecogStars, StarField::UcStars, StarField::LcStars] {
        store.award_stars("s", field, 2).await.unwrap();
    }
    assert_eq!(store.get("s").await.unwrap().games_unlocked, UnlockState::Locked);

    let p = store
        .set_confusion_score("s", 80.0, ConfusionScoreOptions::default())
        .await
        .unwrap();
    assert_eq!(p.games_unlocked, UnlockState::Unlocked);

    // a later low measurement and lowered stars do not relock
    store
        .set_confusion_score("s", 10.0, ConfusionScoreOptions::default())
        .await
        .unwrap();
    let p = store
        .patch(
            "s",
            LetterPatch {
                uc_stars: Some(0),
                lc_stars: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!p.meets_unlock_rule());
    assert_eq!(p.games_unlocked, UnlockState::Unlocked);
    assert!(store.get("s").await.unwrap().is_unlocked());
}

#[tokio::test]
async fn test_patch_round_trip_leaves_other_fields() {
    let (_kv, store) = store();
    store.award_stars("r", StarField::PictureStars, 3).await.unwrap();
    store.add_time_spent("r", 4_000).await.unwrap();
    let before = store.get("r").await.unwrap();

    let after = store
        .patch(
            "r",
            LetterPatch {
                uc_stars: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(store.get("r").await.unwrap(), after);
    assert_eq!(after.uc_stars, 2);
    assert_eq!(
        LetterProgress {
            uc_stars: before.uc_stars,
            ..after
        },
        before
    );
}

#[tokio::test]
async fn test_time_spent_accumulates_and_ignores_negative() {
    let (_kv, store) = store();
    store.add_time_spent("t", 1_500).await.unwrap();
    store.add_time_spent("t", -9_000).await.unwrap();
    let p = store.add_time_spent("t", 500).await.unwrap();
    assert_eq!(p.time_spent_ms, 2_000);
}

#[tokio::test]
async fn test_reset_and_clear_all() {
    let (kv, store) = store();
    store.award_stars("a", StarField::RecogStars, 3).await.unwrap();
    store.award_stars("z", StarField::RecogStars, 1).await.unwrap();
    store.award_stars("garden", StarField::PuzzleStars, 2).await.unwrap();

    let fresh = store.reset("a").await.unwrap();
    assert_eq!(fresh, LetterProgress::default());
    assert_eq!(store.get("a").await.unwrap(), LetterProgress::default());

    store.clear_all().await.unwrap();
    assert_eq!(store.get("z").await.unwrap().recog_stars, 0);
    // non-canonical ids are outside the a-z sweep
    assert_eq!(store.get("garden").await.unwrap().puzzle_stars, 2);
    assert_eq!(kv.len().await, 1);
}

#[tokio::test]
async fn test_get_all_always_returns_26_letters() {
    let (_kv, store) = store();
    assert_eq!(store.get_all().await.unwrap().len(), 26);

    store.award_stars("c", StarField::UcStars, 1).await.unwrap();
    store.award_stars("common", StarField::UcStars, 1).await.unwrap();
    let all = store.get_all().await.unwrap();

    assert_eq!(all.len(), 26);
    let ids: String = all.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, "abcdefghijklmnopqrstuvwxyz");
    assert_eq!(all[2].data.uc_stars, 1);
}

#[tokio::test]
async fn test_total_stars() {
    let (_kv, store) = store();
    assert_eq!(store.total_stars().await.unwrap(), 0);

    store.award_stars("a", StarField::RecogStars, 3).await.unwrap();
    store.award_stars("b", StarField::UcStars, 2).await.unwrap();
    assert_eq!(store.total_stars().await.unwrap(), 5);

    store.award_stars("b", StarField::CatchStars, 1).await.unwrap();
    assert_eq!(store.total_stars().await.unwrap(), 6);
}

#[tokio::test]
async fn test_write_failures_propagate() {
    let (kv, store) = store();
    kv.set_fail_writes(true);

    let err = store
        .set_confusion_score("f", 50.0, ConfusionScoreOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "backend");
    assert!(store.reset("f").await.is_err());
    assert!(store.add_time_spent("f", 10).await.is_err());
}
