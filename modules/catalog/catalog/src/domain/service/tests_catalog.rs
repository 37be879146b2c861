#![allow(clippy::unwrap_used, clippy::expect_used)]

use catalog_sdk::{
    CommentPatch, NewComment, NewReview, NewTitle, PageRequest, Review, ReviewPatch, Taxon,
    Title, TitleFilter, TitlePatch,
};
use sea_orm::DatabaseConnection;
use time::OffsetDateTime;
use uuid::Uuid;
use yamdb_security::{Role, SecurityContext};

use crate::domain::error::DomainError;
use crate::domain::models::NewReviewRecord;
use crate::domain::repos::ReviewsRepository;
use crate::domain::validation;
use crate::infra::storage::OrmReviewsRepository;
use crate::module::{AppServices, CatalogModule};
use crate::test_support::{
    RecordingMailSender, build_module, ctx_anonymous, ctx_for, inmem_db, seed_superuser,
    seed_user,
};

struct Fixture {
    db: DatabaseConnection,
    module: CatalogModule,
    admin: SecurityContext,
    alice: SecurityContext,
    bob: SecurityContext,
    moderator: SecurityContext,
}

impl Fixture {
    async fn new() -> Self {
        let db = inmem_db().await;
        let module = build_module(db.clone(), RecordingMailSender::new());

        let admin = ctx_for(&seed_superuser(&db, "root").await);
        let alice = ctx_for(&seed_user(&db, "alice", Role::User).await);
        let bob = ctx_for(&seed_user(&db, "bob", Role::User).await);
        let moderator = ctx_for(&seed_user(&db, "mod", Role::Moderator).await);

        let fx = Self {
            db,
            module,
            admin,
            alice,
            bob,
            moderator,
        };
        for (name, slug) in [("Book", "book"), ("Film", "film")] {
            fx.svc()
                .categories
                .create(&fx.admin, taxon(name, slug))
                .await
                .unwrap();
        }
        for (name, slug) in [("Science fiction", "scifi"), ("Drama", "drama")] {
            fx.svc()
                .genres
                .create(&fx.admin, taxon(name, slug))
                .await
                .unwrap();
        }
        fx
    }

    fn svc(&self) -> &AppServices {
        self.module.services()
    }

    async fn dune(&self) -> Title {
        self.svc()
            .titles
            .create(&self.admin, dune())
            .await
            .unwrap()
    }

    async fn review(
        &self,
        ctx: &SecurityContext,
        title: Uuid,
        score: i32,
    ) -> Result<Review, DomainError> {
        self.svc()
            .reviews
            .create(
                ctx,
                title,
                NewReview {
                    text: format!("scored {score}"),
                    score,
                },
            )
            .await
    }
}

fn taxon(name: &str, slug: &str) -> Taxon {
    Taxon {
        name: name.to_owned(),
        slug: slug.to_owned(),
    }
}

fn dune() -> NewTitle {
    NewTitle {
        name: "Dune".to_owned(),
        year: 1965,
        description: None,
        genre: vec!["scifi".to_owned()],
        category: Some("book".to_owned()),
    }
}

fn page() -> PageRequest {
    PageRequest::new(None, None, 10, 100)
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("rating should be present");
    assert!((actual - expected).abs() < 1e-9, "rating {actual} != {expected}");
}

fn field_errors(err: DomainError) -> Vec<String> {
    match err {
        DomainError::Validation(errors) => errors.into_keys().collect(),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn title_creation_is_admin_only() {
    let fx = Fixture::new().await;

    let err = fx.svc().titles.create(&fx.alice, dune()).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let err = fx.svc().titles.create(&fx.moderator, dune()).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let err = fx
        .svc()
        .titles
        .create(&ctx_anonymous(), dune())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));

    let title = fx.dune().await;
    assert_eq!(title.name, "Dune");
    assert_eq!(title.rating, None);
    assert_eq!(title.category, Some(taxon("Book", "book")));
    assert_eq!(title.genre, vec![taxon("Science fiction", "scifi")]);
}

#[tokio::test]
async fn anyone_may_read_titles() {
    let fx = Fixture::new().await;
    let title = fx.dune().await;

    let fetched = fx
        .svc()
        .titles
        .get(&ctx_anonymous(), title.id)
        .await
        .unwrap();
    assert_eq!(fetched, title);

    let err = fx
        .svc()
        .titles
        .get(&ctx_anonymous(), Uuid::now_v7())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "title", .. }));
}

#[tokio::test]
async fn rating_is_the_mean_of_review_scores() {
    let fx = Fixture::new().await;
    let title = fx.dune().await;

    fx.review(&fx.alice, title.id, 8).await.unwrap();
    fx.review(&fx.bob, title.id, 3).await.unwrap();

    let title = fx.svc().titles.get(&fx.alice, title.id).await.unwrap();
    assert_close(title.rating, 5.5);

    let listed = fx
        .svc()
        .titles
        .list(&ctx_anonymous(), &TitleFilter::default(), page())
        .await
        .unwrap();
    assert_close(listed.results[0].rating, 5.5);
}

#[tokio::test]
async fn second_review_by_same_author_conflicts() {
    let fx = Fixture::new().await;
    let title = fx.dune().await;

    fx.review(&fx.alice, title.id, 8).await.unwrap();
    let err = fx.review(&fx.alice, title.id, 3).await.unwrap_err();
    match err {
        DomainError::Conflict { field, message } => {
            assert_eq!(field, "title");
            assert_eq!(message, validation::DUPLICATE_REVIEW);
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    let title = fx.svc().titles.get(&fx.alice, title.id).await.unwrap();
    assert_close(title.rating, 8.0);
}

#[tokio::test]
async fn unique_index_rejects_duplicate_review_without_precheck() {
    let fx = Fixture::new().await;
    let title = fx.dune().await;
    let author = fx.alice.subject_id().unwrap();
    let repo = OrmReviewsRepository::new(fx.db.clone());

    let record = |score| NewReviewRecord {
        id: Uuid::now_v7(),
        title_id: title.id,
        author_id: author,
        text: "racing writer".to_owned(),
        score,
        pub_date: OffsetDateTime::now_utc(),
    };
    repo.create(record(8)).await.unwrap();
    let err = repo.create(record(3)).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict { field: "title", .. }));
}

#[tokio::test]
async fn score_must_be_between_one_and_ten() {
    let fx = Fixture::new().await;
    let title = fx.dune().await;

    for score in [0, 11] {
        let err = fx.review(&fx.alice, title.id, score).await.unwrap_err();
        assert_eq!(field_errors(err), vec!["score".to_owned()]);
    }
    fx.review(&fx.alice, title.id, 10).await.unwrap();

    let reviews = fx
        .svc()
        .reviews
        .list(&ctx_anonymous(), title.id, page())
        .await
        .unwrap();
    assert_eq!(reviews.count, 1);
}

#[tokio::test]
async fn future_year_is_rejected_on_create_and_update() {
    let fx = Fixture::new().await;
    let next_year = OffsetDateTime::now_utc().year() + 1;

    let err = fx
        .svc()
        .titles
        .create(
            &fx.admin,
            NewTitle {
                year: next_year,
                ..dune()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(field_errors(err), vec!["year".to_owned()]);

    let title = fx.dune().await;
    let err = fx
        .svc()
        .titles
        .update(
            &fx.admin,
            title.id,
            TitlePatch {
                year: Some(next_year),
                ..TitlePatch::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(field_errors(err), vec!["year".to_owned()]);
}

#[tokio::test]
async fn unknown_taxonomy_slugs_are_field_errors() {
    let fx = Fixture::new().await;

    let err = fx
        .svc()
        .titles
        .create(
            &fx.admin,
            NewTitle {
                genre: vec!["scifi".to_owned(), "western".to_owned()],
                category: Some("podcast".to_owned()),
                ..dune()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        field_errors(err),
        vec!["category".to_owned(), "genre".to_owned()]
    );
}

#[tokio::test]
async fn title_update_replaces_genres() {
    let fx = Fixture::new().await;
    let title = fx.dune().await;

    let updated = fx
        .svc()
        .titles
        .update(
            &fx.admin,
            title.id,
            TitlePatch {
                description: Some("Desert planet".to_owned()),
                genre: Some(vec!["drama".to_owned(), "scifi".to_owned(), "drama".to_owned()]),
                category: Some("film".to_owned()),
                ..TitlePatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Dune");
    assert_eq!(updated.description.as_deref(), Some("Desert planet"));
    assert_eq!(updated.category, Some(taxon("Film", "film")));
    assert_eq!(
        updated.genre,
        vec![taxon("Drama", "drama"), taxon("Science fiction", "scifi")]
    );
}

#[tokio::test]
async fn title_filters_combine() {
    let fx = Fixture::new().await;
    fx.dune().await;
    fx.svc()
        .titles
        .create(
            &fx.admin,
            NewTitle {
                name: "Solaris".to_owned(),
                year: 1972,
                description: None,
                genre: vec!["drama".to_owned()],
                category: Some("film".to_owned()),
            },
        )
        .await
        .unwrap();

    let names = |filter: TitleFilter| {
        let svc = fx.svc();
        async move {
            svc.titles
                .list(&ctx_anonymous(), &filter, page())
                .await
                .unwrap()
                .results
                .into_iter()
                .map(|t| t.name)
                .collect::<Vec<_>>()
        }
    };

    assert_eq!(names(TitleFilter::default()).await, vec!["Solaris", "Dune"]);
    assert_eq!(
        names(TitleFilter {
            name: Some("dun".to_owned()),
            ..TitleFilter::default()
        })
        .await,
        vec!["Dune"]
    );
    assert_eq!(
        names(TitleFilter {
            genre: Some("drama".to_owned()),
            ..TitleFilter::default()
        })
        .await,
        vec!["Solaris"]
    );
    assert_eq!(
        names(TitleFilter {
            category: Some("book".to_owned()),
            year: Some(1965),
            ..TitleFilter::default()
        })
        .await,
        vec!["Dune"]
    );
    assert!(
        names(TitleFilter {
            category: Some("book".to_owned()),
            year: Some(1972),
            ..TitleFilter::default()
        })
        .await
        .is_empty()
    );

    // Cyrillic names match in any case, including after a rename.
    let stalker = fx
        .svc()
        .titles
        .create(
            &fx.admin,
            NewTitle {
                name: "Сталкер".to_owned(),
                year: 1979,
                ..dune_without_taxonomy()
            },
        )
        .await
        .unwrap();
    for needle in ["Сталкер", "сталк", "СТАЛКЕР"] {
        assert_eq!(
            names(TitleFilter {
                name: Some(needle.to_owned()),
                ..TitleFilter::default()
            })
            .await,
            vec!["Сталкер"],
            "needle {needle}"
        );
    }
    fx.svc()
        .titles
        .update(
            &fx.admin,
            stalker.id,
            TitlePatch {
                name: Some("Зеркало".to_owned()),
                ..TitlePatch::default()
            },
        )
        .await
        .unwrap();
    assert!(
        names(TitleFilter {
            name: Some("сталкер".to_owned()),
            ..TitleFilter::default()
        })
        .await
        .is_empty()
    );
    assert_eq!(
        names(TitleFilter {
            name: Some("ЗЕРК".to_owned()),
            ..TitleFilter::default()
        })
        .await,
        vec!["Зеркало"]
    );
}

#[tokio::test]
async fn deleting_a_category_keeps_its_titles() {
    let fx = Fixture::new().await;
    let title = fx.dune().await;

    fx.svc().categories.delete(&fx.admin, "book").await.unwrap();

    let title = fx.svc().titles.get(&fx.admin, title.id).await.unwrap();
    assert_eq!(title.category, None);
    assert_eq!(title.genre.len(), 1);

    let err = fx
        .svc()
        .categories
        .delete(&fx.admin, "book")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "category", .. }));
}

#[tokio::test]
async fn deleting_a_title_removes_its_reviews_and_comments() {
    let fx = Fixture::new().await;
    let title = fx.dune().await;
    let review = fx.review(&fx.alice, title.id, 7).await.unwrap();
    fx.svc()
        .comments
        .create(
            &fx.bob,
            title.id,
            review.id,
            NewComment {
                text: "agreed".to_owned(),
            },
        )
        .await
        .unwrap();

    fx.svc().titles.delete(&fx.admin, title.id).await.unwrap();

    let err = fx
        .svc()
        .reviews
        .get(&fx.alice, title.id, review.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    let err = fx
        .svc()
        .titles
        .delete(&fx.admin, title.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "title", .. }));
}

#[tokio::test]
async fn review_edits_are_for_author_and_staff() {
    let fx = Fixture::new().await;
    let title = fx.dune().await;
    let review = fx.review(&fx.alice, title.id, 6).await.unwrap();
    assert_eq!(review.authored.author, "alice");
    assert_eq!(review.title, title.id);

    let patch = |score| ReviewPatch {
        text: None,
        score: Some(score),
    };

    let err = fx
        .svc()
        .reviews
        .update(&fx.bob, title.id, review.id, patch(1))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let updated = fx
        .svc()
        .reviews
        .update(&fx.alice, title.id, review.id, patch(9))
        .await
        .unwrap();
    assert_eq!(updated.score, 9);
    assert_eq!(updated.authored.text, review.authored.text);

    let updated = fx
        .svc()
        .reviews
        .update(&fx.moderator, title.id, review.id, patch(4))
        .await
        .unwrap();
    assert_eq!(updated.score, 4);
    assert_eq!(updated.authored.author, "alice");

    let err = fx
        .svc()
        .reviews
        .update(&fx.alice, title.id, review.id, patch(12))
        .await
        .unwrap_err();
    assert_eq!(field_errors(err), vec!["score".to_owned()]);

    fx.svc()
        .reviews
        .delete(&fx.admin, title.id, review.id)
        .await
        .unwrap();
    let title = fx.svc().titles.get(&fx.alice, title.id).await.unwrap();
    assert_eq!(title.rating, None);
}

#[tokio::test]
async fn comments_are_scoped_to_the_path() {
    let fx = Fixture::new().await;
    let dune = fx.dune().await;
    let other = fx
        .svc()
        .titles
        .create(
            &fx.admin,
            NewTitle {
                name: "Hyperion".to_owned(),
                year: 1989,
                ..dune_without_taxonomy()
            },
        )
        .await
        .unwrap();
    let review = fx.review(&fx.alice, dune.id, 9).await.unwrap();

    let comment = fx
        .svc()
        .comments
        .create(
            &fx.bob,
            dune.id,
            review.id,
            NewComment {
                text: "Spice must flow".to_owned(),
            },
        )
        .await
        .unwrap();
    assert_eq!(comment.review, review.id);
    assert_eq!(comment.authored.author, "bob");

    let err = fx
        .svc()
        .comments
        .get(&fx.bob, other.id, review.id, comment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "review", .. }));

    let err = fx
        .svc()
        .comments
        .update(
            &fx.alice,
            dune.id,
            review.id,
            comment.id,
            CommentPatch {
                text: Some("hijacked".to_owned()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let listed = fx
        .svc()
        .comments
        .list(&ctx_anonymous(), dune.id, review.id, page())
        .await
        .unwrap();
    assert_eq!(listed.count, 1);

    fx.svc()
        .comments
        .delete(&fx.moderator, dune.id, review.id, comment.id)
        .await
        .unwrap();
    let listed = fx
        .svc()
        .comments
        .list(&ctx_anonymous(), dune.id, review.id, page())
        .await
        .unwrap();
    assert_eq!(listed.count, 0);
}

fn dune_without_taxonomy() -> NewTitle {
    NewTitle {
        genre: Vec::new(),
        category: None,
        ..dune()
    }
}

#[tokio::test]
async fn taxonomy_slug_is_unique_and_searchable() {
    let fx = Fixture::new().await;

    let err = fx
        .svc()
        .genres
        .create(&fx.admin, taxon("Sci-Fi again", "scifi"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { field: "slug", .. }));

    let err = fx
        .svc()
        .genres
        .create(&fx.alice, taxon("Horror", "horror"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let found = fx
        .svc()
        .genres
        .list(&ctx_anonymous(), Some("FICTION"), page())
        .await
        .unwrap();
    assert_eq!(found.results, vec![taxon("Science fiction", "scifi")]);

    let all = fx
        .svc()
        .genres
        .list(&ctx_anonymous(), None, page())
        .await
        .unwrap();
    assert_eq!(all.count, 2);
    assert_eq!(all.results[0].slug, "drama");

    fx.svc()
        .genres
        .create(&fx.admin, taxon("Фантастика", "fantastika"))
        .await
        .unwrap();
    let found = fx
        .svc()
        .genres
        .list(&ctx_anonymous(), Some("ФАНТАСТ"), page())
        .await
        .unwrap();
    assert_eq!(found.results, vec![taxon("Фантастика", "fantastika")]);
}

#[tokio::test]
async fn lists_are_paginated() {
    let fx = Fixture::new().await;
    for year in 1990..1995 {
        fx.svc()
            .titles
            .create(
                &fx.admin,
                NewTitle {
                    name: format!("Title {year}"),
                    year,
                    ..dune_without_taxonomy()
                },
            )
            .await
            .unwrap();
    }

    let second = fx
        .svc()
        .titles
        .list(
            &ctx_anonymous(),
            &TitleFilter::default(),
            PageRequest::new(Some(2), Some(2), 10, 100),
        )
        .await
        .unwrap();
    assert_eq!(second.count, 5);
    assert_eq!(second.page, 2);
    assert_eq!(
        second.results.iter().map(|t| t.year).collect::<Vec<_>>(),
        vec![1992, 1991]
    );

    let far = fx
        .svc()
        .titles
        .list(
            &ctx_anonymous(),
            &TitleFilter::default(),
            PageRequest::new(Some(100_000_000_000_000_000), Some(100), 10, 100),
        )
        .await
        .unwrap();
    assert_eq!(far.count, 5);
    assert!(far.results.is_empty());

    let far = fx
        .svc()
        .genres
        .list(
            &ctx_anonymous(),
            None,
            PageRequest::new(Some(u64::MAX), Some(1), 10, 100),
        )
        .await
        .unwrap();
    assert_eq!(far.count, 2);
    assert!(far.results.is_empty());
}
