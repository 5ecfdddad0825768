//! Catalog and review flows against the in-memory stores

use std::sync::Arc;

use auth::domain::repository::UserRepository;
use auth::middleware::resolve_actor;
use auth::models::{Email, User, UserName, UserRole};
use auth::policy::{Actor, Principal};
use auth::{AuthConfig, MemoryIdentityStore, TokenService};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Datelike, Utc};
use http_body_util::BodyExt;
use kernel::id::{ReviewId, TitleId};
use tower::ServiceExt;

use crate::application::{
    CommentsUseCase, ReviewInput, ReviewsUseCase, TaxonomyUseCase, TitlesUseCase,
};
use crate::domain::entity::{ReviewChanges, TaxonKind, TitleChanges, TitleFilter, TitleInput};
use crate::{ContentError, MemoryContentStore, content_router};

struct Harness {
    identities: MemoryIdentityStore,
    store: MemoryContentStore,
    tokens: Arc<TokenService>,
    admin: Actor,
}

impl Harness {
    async fn new() -> Self {
        let identities = MemoryIdentityStore::new();
        let mut h = Self {
            store: MemoryContentStore::new(identities.clone()),
            identities,
            tokens: Arc::new(TokenService::new(&AuthConfig::development())),
            admin: Actor::Anonymous,
        };
        h.admin = h.actor("root", UserRole::Admin).await.1;

        let categories = TaxonomyUseCase::new(h.repo(), TaxonKind::Category);
        categories.create(&h.admin, "Movie".into(), "movie".into()).await.unwrap();
        let genres = TaxonomyUseCase::new(h.repo(), TaxonKind::Genre);
        genres.create(&h.admin, "Drama".into(), "drama".into()).await.unwrap();
        genres.create(&h.admin, "Comedy".into(), "comedy".into()).await.unwrap();
        h
    }

    fn repo(&self) -> Arc<MemoryContentStore> {
        Arc::new(self.store.clone())
    }

    async fn actor(&self, user_name: &str, role: UserRole) -> (User, Actor) {
        let email = format!("{user_name}@example.com");
        let mut user = User::new(UserName::new(user_name).unwrap(), Email::new(&email).unwrap());
        user.set_role(role);
        self.identities.put_user(user.clone()).await;
        let actor = Actor::Authenticated(Principal::from(&user));
        (user, actor)
    }

    async fn title(&self, name: &str) -> TitleId {
        TitlesUseCase::new(self.repo())
            .create(
                &self.admin,
                TitleInput {
                    name: name.to_string(),
                    year: 1999,
                    category: Some("movie".to_string()),
                    genres: vec!["drama".to_string()],
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn review(&self, actor: &Actor, title_id: TitleId, score: i64) -> ContentResultId {
        ReviewsUseCase::new(self.repo())
            .create(
                actor,
                title_id,
                ReviewInput {
                    text: "worth a watch".to_string(),
                    score,
                },
            )
            .await
            .map(|r| r.id)
    }

    async fn rating(&self, title_id: TitleId) -> Option<i32> {
        TitlesUseCase::new(self.repo())
            .get(&Actor::Anonymous, title_id)
            .await
            .unwrap()
            .rating
    }

    fn router(&self) -> Router {
        content_router(self.store.clone()).layer(axum::middleware::from_fn_with_state(
            self.tokens.clone(),
            resolve_actor,
        ))
    }

    fn bearer(&self, user: &User) -> String {
        format!("Bearer {}", self.tokens.issue(user).unwrap())
    }
}

type ContentResultId = Result<ReviewId, ContentError>;

// ============================================================================
// Reviews: uniqueness & rating
// ============================================================================

#[tokio::test]
async fn test_concurrent_duplicate_review_admits_one() {
    let h = Arc::new(Harness::new().await);
    let title_id = h.title("Heat").await;
    let (_, alice) = h.actor("alice", UserRole::User).await;

    let mut tasks = Vec::new();
    for score in 1..=8 {
        let h = h.clone();
        let alice = alice.clone();
        tasks.push(tokio::spawn(async move { h.review(&alice, title_id, score).await }));
    }

    let mut created = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => created += 1,
            Err(ContentError::DuplicateReview) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(h.store.review_count().await, 1);
}

#[tokio::test]
async fn test_same_author_may_review_other_titles() {
    let h = Harness::new().await;
    let a = h.title("A").await;
    let b = h.title("B").await;
    let (_, alice) = h.actor("alice", UserRole::User).await;

    h.review(&alice, a, 5).await.unwrap();
    h.review(&alice, b, 5).await.unwrap();
    assert!(matches!(
        h.review(&alice, a, 9).await,
        Err(ContentError::DuplicateReview)
    ));
}

#[tokio::test]
async fn test_rating_is_rounded_mean() {
    let h = Harness::new().await;
    let title_id = h.title("Heat").await;
    assert_eq!(h.rating(title_id).await, None);

    for (name, score) in [("a", 4), ("b", 6), ("c", 10)] {
        let (_, actor) = h.actor(name, UserRole::User).await;
        h.review(&actor, title_id, score).await.unwrap();
    }
    assert_eq!(h.rating(title_id).await, Some(7));

    // a single minimum score is a rating, not the absence of one
    let other = h.title("Ronin").await;
    let (_, d) = h.actor("d", UserRole::User).await;
    h.review(&d, other, 1).await.unwrap();
    assert_eq!(h.rating(other).await, Some(1));
}

#[tokio::test]
async fn test_score_range_on_create_and_update() {
    let h = Harness::new().await;
    let title_id = h.title("Heat").await;
    let (_, alice) = h.actor("alice", UserRole::User).await;

    assert!(matches!(
        h.review(&alice, title_id, 0).await,
        Err(ContentError::ScoreOutOfRange(0))
    ));
    assert!(matches!(
        h.review(&alice, title_id, 11).await,
        Err(ContentError::ScoreOutOfRange(11))
    ));

    let review_id = h.review(&alice, title_id, 5).await.unwrap();
    let reviews = ReviewsUseCase::new(h.repo());
    let result = reviews
        .update(
            &alice,
            title_id,
            review_id,
            ReviewChanges {
                text: Some("changed".to_string()),
                score: Some(42),
            },
        )
        .await;
    assert!(matches!(result, Err(ContentError::ScoreOutOfRange(42))));

    // nothing applied
    let review = reviews.get(&alice, title_id, review_id).await.unwrap();
    assert_eq!(review.text, "worth a watch");
    assert_eq!(review.score.get(), 5);
}

// ============================================================================
// Permissions
// ============================================================================

#[tokio::test]
async fn test_review_edit_requires_owner_or_moderator() {
    let h = Harness::new().await;
    let title_id = h.title("Heat").await;
    let (_, alice) = h.actor("alice", UserRole::User).await;
    let (_, bob) = h.actor("bob", UserRole::User).await;
    let (_, moderator) = h.actor("mod", UserRole::Moderator).await;
    let review_id = h.review(&alice, title_id, 5).await.unwrap();
    let reviews = ReviewsUseCase::new(h.repo());

    let edit = |text: &str| ReviewChanges {
        text: Some(text.to_string()),
        score: None,
    };

    assert!(matches!(
        reviews.update(&bob, title_id, review_id, edit("mine now")).await,
        Err(ContentError::PermissionDenied)
    ));
    assert!(matches!(
        reviews.update(&Actor::Anonymous, title_id, review_id, edit("anon")).await,
        Err(ContentError::Unauthenticated)
    ));

    let review = reviews
        .update(&alice, title_id, review_id, edit("still great"))
        .await
        .unwrap();
    assert_eq!(review.text, "still great");

    let review = reviews
        .update(&moderator, title_id, review_id, edit("[edited]"))
        .await
        .unwrap();
    assert_eq!(review.text, "[edited]");

    assert!(matches!(
        reviews.delete(&bob, title_id, review_id).await,
        Err(ContentError::PermissionDenied)
    ));
    reviews.delete(&moderator, title_id, review_id).await.unwrap();
}

#[tokio::test]
async fn test_catalog_writes_are_admin_only() {
    let h = Harness::new().await;
    let (_, alice) = h.actor("alice", UserRole::User).await;
    let (_, moderator) = h.actor("mod", UserRole::Moderator).await;
    let genres = TaxonomyUseCase::new(h.repo(), TaxonKind::Genre);

    assert!(matches!(
        genres.create(&Actor::Anonymous, "Horror".into(), "horror".into()).await,
        Err(ContentError::Unauthenticated)
    ));
    assert!(matches!(
        genres.create(&alice, "Horror".into(), "horror".into()).await,
        Err(ContentError::PermissionDenied)
    ));
    assert!(matches!(
        genres.delete(&moderator, "drama").await,
        Err(ContentError::PermissionDenied)
    ));

    // superuser with a plain role is still an admin
    let (mut root, _) = h.actor("super", UserRole::User).await;
    root.is_superuser = true;
    let superuser = Actor::Authenticated(Principal::from(&root));
    genres.create(&superuser, "Horror".into(), "horror".into()).await.unwrap();

    let listed = genres.list(&Actor::Anonymous, Some("HOR")).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].slug.as_str(), "horror");
}

#[tokio::test]
async fn test_comment_permissions_follow_reviews() {
    let h = Harness::new().await;
    let title_id = h.title("Heat").await;
    let (_, alice) = h.actor("alice", UserRole::User).await;
    let (_, bob) = h.actor("bob", UserRole::User).await;
    let (_, admin) = h.actor("boss", UserRole::Admin).await;
    let review_id = h.review(&alice, title_id, 8).await.unwrap();

    let comments = CommentsUseCase::new(h.repo());
    let comment = comments
        .create(&bob, title_id, review_id, "agreed".to_string())
        .await
        .unwrap();
    let path = (title_id, review_id, comment.id);

    assert!(matches!(
        comments.update(&alice, path, Some("hijack".to_string())).await,
        Err(ContentError::PermissionDenied)
    ));
    let updated = comments
        .update(&bob, path, Some("strongly agreed".to_string()))
        .await
        .unwrap();
    assert_eq!(updated.text, "strongly agreed");

    comments.delete(&admin, path).await.unwrap();
    assert!(matches!(
        comments.get(&Actor::Anonymous, path).await,
        Err(ContentError::CommentNotFound)
    ));
}

// ============================================================================
// Titles
// ============================================================================

#[tokio::test]
async fn test_title_validation() {
    let h = Harness::new().await;
    let titles = TitlesUseCase::new(h.repo());
    let input = |year: i32, genres: &[&str]| TitleInput {
        name: "Future".to_string(),
        year,
        genres: genres.iter().map(|g| g.to_string()).collect(),
        ..Default::default()
    };

    let next_year = Utc::now().year() + 1;
    assert!(matches!(
        titles.create(&h.admin, input(next_year, &["drama"])).await,
        Err(ContentError::YearInFuture(y)) if y == next_year
    ));
    assert!(matches!(
        titles.create(&h.admin, input(2000, &["drama", "horror"])).await,
        Err(ContentError::UnknownGenre(g)) if g == "horror"
    ));
    assert!(matches!(
        titles.create(&h.admin, input(2000, &[])).await,
        Err(ContentError::Validation(e)) if e.field == "genre"
    ));
    titles.create(&h.admin, input(Utc::now().year(), &["drama"])).await.unwrap();
}

#[tokio::test]
async fn test_title_patch_and_filters() {
    let h = Harness::new().await;
    let titles = TitlesUseCase::new(h.repo());
    let heat = h.title("Heat").await;
    h.title("Ronin").await;

    let patched = titles
        .update(
            &h.admin,
            heat,
            TitleChanges {
                category: Some(None),
                genres: Some(vec!["comedy".to_string(), "drama".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(patched.category.is_none());
    assert_eq!(patched.name, "Heat");
    assert_eq!(patched.genres.len(), 2);

    let comedies = titles
        .list(
            &Actor::Anonymous,
            &TitleFilter {
                genre: Some("comedy".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(comedies.len(), 1);
    assert_eq!(comedies[0].id, heat);

    let by_name = titles
        .list(
            &Actor::Anonymous,
            &TitleFilter {
                name: Some("RON".to_string()),
                category: Some("movie".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Ronin");
}

#[tokio::test]
async fn test_title_stays_editable_after_losing_its_last_genre() {
    let h = Harness::new().await;
    let titles = TitlesUseCase::new(h.repo());
    let heat = h.title("Heat").await;

    TaxonomyUseCase::new(h.repo(), TaxonKind::Genre)
        .delete(&h.admin, "drama")
        .await
        .unwrap();
    assert!(titles.get(&Actor::Anonymous, heat).await.unwrap().genres.is_empty());

    let renamed = titles
        .update(
            &h.admin,
            heat,
            TitleChanges {
                name: Some("Heat (1995)".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Heat (1995)");
    assert!(renamed.genres.is_empty());

    let result = titles
        .update(
            &h.admin,
            heat,
            TitleChanges {
                genres: Some(vec![]),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ContentError::Validation(e)) if e.field == "genre"));
}

#[tokio::test]
async fn test_title_delete_cascades_to_reviews_and_comments() {
    let h = Harness::new().await;
    let title_id = h.title("Heat").await;
    let (_, alice) = h.actor("alice", UserRole::User).await;
    let review_id = h.review(&alice, title_id, 7).await.unwrap();
    CommentsUseCase::new(h.repo())
        .create(&alice, title_id, review_id, "self-reply".to_string())
        .await
        .unwrap();

    TitlesUseCase::new(h.repo()).delete(&h.admin, title_id).await.unwrap();

    assert_eq!(h.store.review_count().await, 0);
    assert!(matches!(
        ReviewsUseCase::new(h.repo()).list(&Actor::Anonymous, title_id).await,
        Err(ContentError::TitleNotFound)
    ));
}

#[tokio::test]
async fn test_review_lookup_is_scoped_to_title() {
    let h = Harness::new().await;
    let heat = h.title("Heat").await;
    let ronin = h.title("Ronin").await;
    let (_, alice) = h.actor("alice", UserRole::User).await;
    let review_id = h.review(&alice, heat, 7).await.unwrap();

    assert!(matches!(
        ReviewsUseCase::new(h.repo()).get(&Actor::Anonymous, ronin, review_id).await,
        Err(ContentError::ReviewNotFound)
    ));
    assert!(matches!(
        CommentsUseCase::new(h.repo())
            .create(&alice, ronin, review_id, "lost".to_string())
            .await,
        Err(ContentError::ReviewNotFound)
    ));
}

#[tokio::test]
async fn test_deleted_author_leaves_orphaned_review() {
    let h = Harness::new().await;
    let title_id = h.title("Heat").await;
    let (alice_user, alice) = h.actor("alice", UserRole::User).await;
    let (_, moderator) = h.actor("mod", UserRole::Moderator).await;
    let review_id = h.review(&alice, title_id, 9).await.unwrap();

    assert!(h.identities.delete(&alice_user.user_id).await.unwrap());

    let reviews = ReviewsUseCase::new(h.repo());
    let review = reviews.get(&Actor::Anonymous, title_id, review_id).await.unwrap();
    assert!(review.author.is_none());
    assert_eq!(h.rating(title_id).await, Some(9));

    // a stale token of the deleted author no longer owns anything
    let edit = ReviewChanges {
        text: Some("ghost".to_string()),
        score: None,
    };
    assert!(matches!(
        reviews.update(&alice, title_id, review_id, edit.clone()).await,
        Err(ContentError::PermissionDenied)
    ));
    reviews.update(&moderator, title_id, review_id, edit).await.unwrap();
}

// ============================================================================
// HTTP
// ============================================================================

async fn send(router: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn json_request(
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, bearer);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_http_title_lifecycle() {
    let h = Harness::new().await;
    let (admin, _) = h.actor("boss", UserRole::Admin).await;
    let (alice, _) = h.actor("alice", UserRole::User).await;
    let admin_bearer = h.bearer(&admin);
    let alice_bearer = h.bearer(&alice);
    let payload = serde_json::json!({
        "name": "Heat",
        "year": 1995,
        "category": "movie",
        "genre": ["drama"]
    });

    let (status, _) = send(h.router(), json_request("POST", "/titles", None, payload.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        h.router(),
        json_request("POST", "/titles", Some(&alice_bearer), payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "PERMISSION_DENIED");

    let (status, body) = send(
        h.router(),
        json_request("POST", "/titles", Some(&admin_bearer), payload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["category"]["slug"], "movie");
    assert_eq!(body["genre"][0]["name"], "Drama");
    assert!(body["rating"].is_null());
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(h.router(), get("/titles?genre=drama&year=1995")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        h.router(),
        json_request(
            "PATCH",
            &format!("/titles/{id}"),
            Some(&admin_bearer),
            serde_json::json!({"year": 9999}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "YEAR_IN_FUTURE");
    assert_eq!(body["fields"][0], "year");

    let req = Request::delete(format!("/titles/{id}"))
        .header(header::AUTHORIZATION, &admin_bearer)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(h.router(), req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(h.router(), get(&format!("/titles/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "TITLE_NOT_FOUND");
}

#[tokio::test]
async fn test_http_reviews_and_comments() {
    let h = Harness::new().await;
    let title_id = h.title("Heat").await;
    let (alice, _) = h.actor("alice", UserRole::User).await;
    let (bob, _) = h.actor("bob", UserRole::User).await;
    let alice_bearer = h.bearer(&alice);
    let bob_bearer = h.bearer(&bob);
    let reviews_uri = format!("/titles/{title_id}/reviews");

    let (status, body) = send(
        h.router(),
        json_request(
            "POST",
            &reviews_uri,
            Some(&alice_bearer),
            serde_json::json!({"text": "tense", "score": 12}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SCORE_OUT_OF_RANGE");

    let (status, body) = send(
        h.router(),
        json_request(
            "POST",
            &reviews_uri,
            Some(&alice_bearer),
            serde_json::json!({"text": "tense", "score": 9}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["author"], "alice");
    assert_eq!(body["score"], 9);
    let review_id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        h.router(),
        json_request(
            "POST",
            &reviews_uri,
            Some(&alice_bearer),
            serde_json::json!({"text": "again", "score": 3}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE_REVIEW");

    let (status, _) = send(
        h.router(),
        json_request(
            "PATCH",
            &format!("{reviews_uri}/{review_id}"),
            Some(&bob_bearer),
            serde_json::json!({"text": "mine"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let comments_uri = format!("{reviews_uri}/{review_id}/comments");
    let (status, body) = send(
        h.router(),
        json_request(
            "POST",
            &comments_uri,
            Some(&bob_bearer),
            serde_json::json!({"text": "agreed"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["author"], "bob");

    let (status, body) = send(h.router(), get(&comments_uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["text"], "agreed");

    let (status, body) = send(h.router(), get(&format!("/titles/{title_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 9);

    let (status, body) = send(
        h.router(),
        get(&format!("/titles/{title_id}/reviews/999/comments")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "REVIEW_NOT_FOUND");
}

#[tokio::test]
async fn test_http_malformed_review_body() {
    let h = Harness::new().await;
    let title_id = h.title("Heat").await;
    let (alice, _) = h.actor("alice", UserRole::User).await;
    let bearer = h.bearer(&alice);
    let reviews_uri = format!("/titles/{title_id}/reviews");

    for payload in [
        serde_json::json!({"text": "tense", "score": 8.5}),
        serde_json::json!({"text": "tense"}),
        serde_json::json!({"text": "tense", "score": "8"}),
    ] {
        let (status, body) = send(
            h.router(),
            json_request("POST", &reviews_uri, Some(&bearer), payload.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(body["code"], "VALIDATION_ERROR", "{payload}");
        assert_eq!(body["fields"][0], "score", "{payload}");
    }

    assert_eq!(h.store.review_count().await, 0);
}
