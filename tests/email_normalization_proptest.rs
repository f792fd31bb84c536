//! Property tests: any case/whitespace variant of a registered email collides.

mod common;

use common::{PASSWORD, login_request, register_request, setup};
use proptest::prelude::*;
use session_auth::auth::{AuthError, normalize_email};

/// Re-case each character and pad with whitespace
fn variant_of(email: &str, upper: &[bool], lead: &str, trail: &str) -> String {
    let body: String = email
        .chars()
        .zip(upper.iter().cycle())
        .map(|(c, &up)| if up { c.to_ascii_uppercase() } else { c })
        .collect();
    format!("{lead}{body}{trail}")
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn normalization_is_idempotent(
        email in "[a-zA-Z0-9._+-]{1,20}@[a-zA-Z0-9-]{1,20}\\.[a-zA-Z]{2,6}",
        lead in "[ \t]{0,3}",
        trail in "[ \t\n]{0,3}",
    ) {
        let once = normalize_email(&format!("{lead}{email}{trail}"));
        prop_assert_eq!(normalize_email(&once), once.clone());
        prop_assert_eq!(once, email.to_lowercase());
    }

    #[test]
    fn email_variants_collide_on_register(
        email in "[a-z0-9]{1,12}@[a-z0-9]{1,12}\\.[a-z]{2,4}",
        upper in prop::collection::vec(any::<bool>(), 1..8),
        lead in "[ \t]{0,3}",
        trail in "[ \t]{0,3}",
    ) {
        let variant = variant_of(&email, &upper, &lead, &trail);

        runtime().block_on(async {
            let (auth, store) = setup();
            auth.register(register_request(&email)).await.unwrap();

            let duplicate = auth.register(register_request(&variant)).await;
            assert!(
                matches!(duplicate, Err(AuthError::Conflict)),
                "{variant:?} should collide with {email:?}"
            );
            assert_eq!(store.len().await, 1);

            let login = auth.login(login_request(&variant, PASSWORD)).await;
            assert!(login.is_ok(), "{variant:?} should log in as {email:?}");
        });
    }
}
