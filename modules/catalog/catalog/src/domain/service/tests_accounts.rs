#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use catalog_sdk::{NewUser, PageRequest, ProfilePatch, SignUp, TokenRequest, UserPatch};
use tracing_test::traced_test;
use yamdb_security::Role;

use super::CONFIRMATION_SUBJECT;
use crate::domain::error::DomainError;
use crate::domain::repos::UsersRepository;
use crate::infra::storage::OrmUsersRepository;
use crate::test_support::{
    FailingMailSender, RecordingMailSender, build_module, ctx_anonymous, ctx_for, inmem_db,
    seed_superuser, seed_user, test_token_issuer,
};

fn sign_up(username: &str, email: &str) -> SignUp {
    SignUp {
        username: username.to_owned(),
        email: email.to_owned(),
    }
}

fn token_request(username: &str, code: &str) -> TokenRequest {
    TokenRequest {
        username: username.to_owned(),
        confirmation_code: code.to_owned(),
    }
}

fn page() -> PageRequest {
    PageRequest::new(None, None, 10, 100)
}

#[tokio::test]
async fn sign_up_mails_a_code_that_buys_one_token() {
    let db = inmem_db().await;
    let mailer = RecordingMailSender::new();
    let module = build_module(db.clone(), mailer.clone());
    let svc = module.services();

    let echoed = svc
        .registration
        .sign_up(sign_up("newbie", "newbie@example.com"))
        .await
        .unwrap();
    assert_eq!(echoed, sign_up("newbie", "newbie@example.com"));

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, CONFIRMATION_SUBJECT);
    assert_eq!(sent[0].to, "newbie@example.com");

    let code = mailer.last_code_for("newbie@example.com").unwrap();
    let token = svc
        .registration
        .obtain_token(token_request("newbie", &code))
        .await
        .unwrap();

    let claims = test_token_issuer().verify(&token.token).unwrap();
    let stored = OrmUsersRepository::new(db)
        .find_by_username("newbie")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(claims.sub, stored.id);
    assert_eq!(stored.role, Role::User);
    assert!(stored.last_login.is_some());

    let err = svc
        .registration
        .obtain_token(token_request("newbie", &code))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidConfirmationCode));
}

#[tokio::test]
async fn concurrent_exchanges_of_one_code_issue_one_token() {
    let db = inmem_db().await;
    let mailer = RecordingMailSender::new();
    let module = build_module(db, mailer.clone());
    let svc = module.services();

    svc.registration
        .sign_up(sign_up("newbie", "newbie@example.com"))
        .await
        .unwrap();
    let code = mailer.last_code_for("newbie@example.com").unwrap();

    let (first, second) = tokio::join!(
        svc.registration.obtain_token(token_request("newbie", &code)),
        svc.registration.obtain_token(token_request("newbie", &code)),
    );
    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|r| matches!(r, Err(DomainError::InvalidConfirmationCode)))
    );
}

#[tokio::test]
async fn stale_login_stamp_is_not_applied() {
    let db = inmem_db().await;
    let repo = OrmUsersRepository::new(db.clone());
    let user = seed_user(&db, "alice", Role::User).await;
    let checked = repo.find_by_id(user.id).await.unwrap().unwrap();

    let now = time::OffsetDateTime::now_utc();
    assert!(repo.stamp_login(user.id, checked.last_login, now).await.unwrap());
    assert!(
        !repo
            .stamp_login(user.id, checked.last_login, now + time::Duration::seconds(1))
            .await
            .unwrap()
    );

    let stamped = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert!(stamped.last_login.is_some());
    assert!(
        repo.stamp_login(user.id, stamped.last_login, now + time::Duration::seconds(2))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn repeated_sign_up_resends_and_partial_matches_conflict() {
    let db = inmem_db().await;
    let mailer = RecordingMailSender::new();
    let module = build_module(db, mailer.clone());
    let svc = module.services();

    svc.registration
        .sign_up(sign_up("alice", "alice@example.com"))
        .await
        .unwrap();
    svc.registration
        .sign_up(sign_up("alice", "alice@example.com"))
        .await
        .unwrap();
    assert_eq!(mailer.sent().len(), 2);

    let err = svc
        .registration
        .sign_up(sign_up("alice", "other@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { field: "username", .. }));

    let err = svc
        .registration
        .sign_up(sign_up("alicia", "alice@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { field: "email", .. }));
    assert_eq!(mailer.sent().len(), 2);
}

#[tokio::test]
async fn reserved_and_malformed_usernames_are_rejected() {
    let db = inmem_db().await;
    let module = build_module(db, RecordingMailSender::new());
    let svc = module.services();

    for username in ["me", "with space", ""] {
        let err = svc
            .registration
            .sign_up(sign_up(username, "x@example.com"))
            .await
            .unwrap_err();
        let DomainError::Validation(errors) = err else {
            panic!("expected validation error for {username:?}");
        };
        assert!(errors.contains_key("username"));
    }
}

#[tokio::test]
async fn wrong_code_and_unknown_user_look_the_same() {
    let db = inmem_db().await;
    let module = build_module(db.clone(), RecordingMailSender::new());
    let svc = module.services();
    seed_user(&db, "bob", Role::User).await;

    let wrong = svc
        .registration
        .obtain_token(token_request("bob", "65f0c2a1-deadbeef"))
        .await
        .unwrap_err();
    let unknown = svc
        .registration
        .obtain_token(token_request("nobody", "65f0c2a1-deadbeef"))
        .await
        .unwrap_err();

    assert!(matches!(wrong, DomainError::InvalidConfirmationCode));
    assert!(matches!(unknown, DomainError::InvalidConfirmationCode));
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[tokio::test]
#[traced_test]
async fn mail_failure_does_not_fail_sign_up() {
    let db = inmem_db().await;
    let module = build_module(db.clone(), Arc::new(FailingMailSender));

    let echoed = module
        .services()
        .registration
        .sign_up(sign_up("carol", "carol@example.com"))
        .await;

    assert!(echoed.is_ok());
    assert!(
        OrmUsersRepository::new(db)
            .find_by_username("carol")
            .await
            .unwrap()
            .is_some()
    );
    assert!(logs_contain("Confirmation mail delivery failed"));
}

#[tokio::test]
async fn admins_manage_users() {
    let db = inmem_db().await;
    let module = build_module(db.clone(), RecordingMailSender::new());
    let svc = module.services();
    let admin = ctx_for(&seed_user(&db, "boss", Role::Admin).await);
    let moderator = ctx_for(&seed_user(&db, "mod", Role::Moderator).await);

    let created = svc
        .users
        .create(
            &admin,
            NewUser {
                username: "dave".to_owned(),
                email: "dave@example.com".to_owned(),
                role: Role::Moderator,
                bio: "film buff".to_owned(),
                ..NewUser::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(created.role, Role::Moderator);

    let err = svc.users.list(&moderator, None, page()).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
    let err = svc.users.list(&ctx_anonymous(), None, page()).await.unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));

    let all = svc.users.list(&admin, None, page()).await.unwrap();
    assert_eq!(
        all.results.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(),
        vec!["boss", "dave", "mod"]
    );
    let found = svc.users.list(&admin, Some("dave"), page()).await.unwrap();
    assert_eq!(found.count, 1);
    let none = svc.users.list(&admin, Some("dav"), page()).await.unwrap();
    assert_eq!(none.count, 0);

    let updated = svc
        .users
        .update(
            &admin,
            "dave",
            UserPatch {
                role: Some(Role::Admin),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.role, Role::Admin);
    assert_eq!(updated.bio, "film buff");

    let err = svc
        .users
        .create(
            &admin,
            NewUser {
                username: "dave".to_owned(),
                email: "dave2@example.com".to_owned(),
                ..NewUser::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { field: "username", .. }));

    svc.users.delete(&admin, "dave").await.unwrap();
    let err = svc.users.get(&admin, "dave").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "user", .. }));
}

#[tokio::test]
async fn self_profile_update_keeps_role() {
    let db = inmem_db().await;
    let module = build_module(db.clone(), RecordingMailSender::new());
    let svc = module.services();
    let erin = ctx_for(&seed_user(&db, "erin", Role::User).await);
    seed_user(&db, "frank", Role::User).await;

    let me = svc
        .users
        .update_me(
            &erin,
            ProfilePatch {
                first_name: Some("Erin".to_owned()),
                bio: Some("reads a lot".to_owned()),
                ..ProfilePatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(me.role, Role::User);
    assert_eq!(me.first_name, "Erin");
    assert_eq!(svc.users.me(&erin).await.unwrap(), me);

    let err = svc
        .users
        .update_me(
            &erin,
            ProfilePatch {
                username: Some("frank".to_owned()),
                ..ProfilePatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { field: "username", .. }));

    let err = svc.users.me(&ctx_anonymous()).await.unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));
}

#[tokio::test]
async fn bootstrap_creates_or_promotes_a_superuser() {
    let db = inmem_db().await;
    let module = build_module(db.clone(), RecordingMailSender::new());
    let svc = module.services();
    let repo = OrmUsersRepository::new(db.clone());

    svc.users
        .bootstrap_superuser("root", "root@example.com")
        .await
        .unwrap();
    let root = repo.find_by_username("root").await.unwrap().unwrap();
    assert!(root.is_superuser);
    assert_eq!(root.role, Role::Admin);

    seed_user(&db, "grace", Role::User).await;
    svc.users
        .bootstrap_superuser("grace", "grace@example.com")
        .await
        .unwrap();
    let grace = repo.find_by_username("grace").await.unwrap().unwrap();
    assert!(grace.is_superuser);
    assert!(grace.identity().is_admin());
}

#[tokio::test]
async fn deleted_user_token_stops_authenticating() {
    let db = inmem_db().await;
    let module = build_module(db.clone(), RecordingMailSender::new());
    let svc = module.services();
    let admin = ctx_for(&seed_superuser(&db, "root").await);
    let henry = seed_user(&db, "henry", Role::User).await;

    let token = test_token_issuer().issue(henry.id, &henry.username).unwrap();
    let ctx = svc.authenticator.authenticate(&token).await.unwrap();
    assert_eq!(ctx.subject_id(), Some(henry.id));

    svc.users.delete(&admin, "henry").await.unwrap();
    let err = svc.authenticator.authenticate(&token).await.unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));

    let err = svc.authenticator.authenticate("not-a-jwt").await.unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));
}
