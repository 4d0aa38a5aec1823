//! Sign-in, sign-up, presence and account maintenance.

use tracing::{debug, info, warn};
use uuid::Uuid;

use larder_db::Database;
use larder_db::models::UserInsert;
use larder_types::events::{Credentials, PasswordChange, ServerEvent};

use crate::dispatcher::Session;
use crate::error::SyncError;
use crate::handler::Gateway;
use crate::nickname::Nickname;
use crate::outcome::{Delivery, Outcome};
use crate::{password, store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    SignedIn,
    SignedUp,
    WrongPassword,
    /// A concurrent signup inserted the same name first.
    NameTaken,
}

impl Gateway {
    pub(crate) async fn authenticate(
        &self,
        conn_id: Uuid,
        credentials: Credentials,
    ) -> Result<Outcome, SyncError> {
        if let Some(current) = self.dispatcher.session(conn_id).await.nickname() {
            debug!("connection {} already signed in as {}, ignoring", conn_id, current);
            return Ok(Outcome::Ignored);
        }

        let nickname = match Nickname::parse(&credentials.nickname) {
            Ok(nickname) => nickname,
            Err(reason) => {
                debug!("connection {}: dropping authenticate: {}", conn_id, reason);
                return Ok(Outcome::Ignored);
            }
        };

        let db = self.db.clone();
        let name = nickname.as_str().to_owned();
        let attempt =
            store::call(move || sign_in_or_up(&db, &name, &credentials.password)).await?;

        Ok(self.settle(conn_id, nickname, attempt).await)
    }

    /// Session and fan-out half of `authenticate`, once the store has answered.
    async fn settle(&self, conn_id: Uuid, nickname: Nickname, attempt: Attempt) -> Outcome {
        let verb = match attempt {
            Attempt::SignedIn => "signed in",
            Attempt::SignedUp => "signed up",
            Attempt::WrongPassword => {
                info!("{} failed to sign in", nickname);
                return Outcome::Rejected(ServerEvent::IncorrectLogin);
            }
            Attempt::NameTaken => {
                warn!("{} lost a signup race", nickname);
                return Outcome::Rejected(ServerEvent::IncorrectLogin);
            }
        };

        let nickname = nickname.into_string();
        self.dispatcher
            .set_session(
                conn_id,
                Session::Authenticated {
                    nickname: nickname.clone(),
                },
            )
            .await;
        info!("{} {}", nickname, verb);

        Outcome::Applied(vec![
            Delivery::Caller(ServerEvent::LoggedIn {
                nickname: nickname.clone(),
            }),
            Delivery::Others(ServerEvent::RequestRefreshPresence),
            Delivery::announcement(format!("+ {} {}.", nickname, verb)),
        ])
    }

    /// Presence side of a closed connection. The session is already unregistered.
    pub(crate) async fn sign_out(&self, session: Session) -> Result<Outcome, SyncError> {
        let Session::Authenticated { nickname } = session else {
            return Ok(Outcome::Ignored);
        };

        let db = self.db.clone();
        let name = nickname.clone();
        store::call(move || db.set_online(&name, false)).await?;
        info!("- {}", nickname);

        Ok(Outcome::Applied(vec![
            Delivery::All(ServerEvent::RequestRefreshPresence),
            Delivery::announcement(format!("- {}", nickname)),
        ]))
    }

    pub(crate) async fn update_password(
        &self,
        conn_id: Uuid,
        change: PasswordChange,
    ) -> Result<Outcome, SyncError> {
        if !self.dispatcher.session(conn_id).await.owns(&change.nickname) {
            debug!(
                "connection {} is not signed in as {}, ignoring password change",
                conn_id, change.nickname
            );
            return Ok(Outcome::Ignored);
        }

        let db = self.db.clone();
        let name = change.nickname.clone();
        let changed = store::call(move || {
            let Some(user) = db.find_user(&name)? else {
                return Ok(false);
            };
            if !password::verify(&change.current_password, &user.password)? {
                return Ok(false);
            }
            let digest = password::hash(&change.new_password)?;
            Ok(db.update_password(&name, &digest)? > 0)
        })
        .await?;

        if changed {
            info!("{} changed their password", change.nickname);
            Ok(Outcome::Applied(vec![Delivery::Caller(
                ServerEvent::PasswordUpdated,
            )]))
        } else {
            Ok(Outcome::Rejected(ServerEvent::IncorrectCurrentPassword))
        }
    }

    /// Delete the account the connection is signed in as. Its recipes stay,
    /// with the author blanked.
    pub(crate) async fn delete_account(
        &self,
        conn_id: Uuid,
        nickname: String,
    ) -> Result<Outcome, SyncError> {
        if !self.dispatcher.session(conn_id).await.owns(&nickname) {
            debug!(
                "connection {} is not signed in as {}, ignoring account deletion",
                conn_id, nickname
            );
            return Ok(Outcome::Ignored);
        }

        // Two independent statements: a crash in between leaves recipes
        // blanked for a user that still exists, never the reverse.
        let db = self.db.clone();
        let name = nickname.clone();
        let orphaned = store::call(move || {
            let orphaned = db.orphan_recipes(&name)?;
            db.delete_user(&name)?;
            Ok(orphaned)
        })
        .await?;

        self.dispatcher.set_session(conn_id, Session::Anonymous).await;
        info!("{} deleted their account ({} recipes orphaned)", nickname, orphaned);

        Ok(Outcome::Applied(vec![
            Delivery::Caller(ServerEvent::ResetClient),
            Delivery::Others(ServerEvent::RequestRefreshPresence),
            Delivery::Others(ServerEvent::RequestRefreshRecipes),
            Delivery::announcement(format!("{} deleted their account!", nickname)),
        ]))
    }
}

/// Blocking half of `authenticate`. The lookup and the insert are separate
/// store calls, so another connection may sign up in between; the UNIQUE
/// constraint settles it.
fn sign_in_or_up(db: &Database, name: &str, password: &str) -> anyhow::Result<Attempt> {
    match db.find_user(name)? {
        Some(user) => {
            if !password::verify(password, &user.password)? {
                return Ok(Attempt::WrongPassword);
            }
            db.set_online(name, true)?;
            Ok(Attempt::SignedIn)
        }
        None => sign_up(db, name, password),
    }
}

fn sign_up(db: &Database, name: &str, password: &str) -> anyhow::Result<Attempt> {
    let digest = password::hash(password)?;
    match db.create_user(name, &digest)? {
        UserInsert::Created(_) => Ok(Attempt::SignedUp),
        UserInsert::NameTaken => Ok(Attempt::NameTaken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::dispatcher::Dispatcher;

    fn gateway() -> Gateway {
        Gateway::new(Arc::new(Database::open_in_memory().unwrap()), Dispatcher::new())
    }

    fn credentials(nickname: &str, password: &str) -> Credentials {
        Credentials {
            nickname: nickname.into(),
            password: password.into(),
        }
    }

    #[test]
    fn losing_the_signup_race_is_a_rejection() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(sign_up(&db, "chef99", "pw1").unwrap(), Attempt::SignedUp);
        assert_eq!(sign_up(&db, "chef99", "pw2").unwrap(), Attempt::NameTaken);
        assert_eq!(db.list_presence().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lost_signup_race_leaves_the_caller_anonymous() {
        let gw = gateway();
        let (conn, mut rx) = gw.dispatcher.register().await;
        let (other, mut other_rx) = gw.dispatcher.register().await;

        // the other connection's insert lands between our lookup and our insert
        gw.db.create_user("chef99", &password::hash("pw-other").unwrap()).unwrap();
        let attempt = sign_up(&gw.db, "chef99", "pw-mine").unwrap();
        assert_eq!(attempt, Attempt::NameTaken);

        let nickname = Nickname::parse("chef99").unwrap();
        let outcome = gw.settle(conn, nickname, attempt).await;
        gw.dispatcher.deliver(conn, outcome.into_deliveries()).await;

        assert_eq!(rx.try_recv().unwrap(), ServerEvent::IncorrectLogin);
        assert!(rx.try_recv().is_err());
        assert!(other_rx.try_recv().is_err());
        assert_eq!(gw.dispatcher.session(conn).await, Session::Anonymous);
        assert_eq!(gw.dispatcher.session(other).await, Session::Anonymous);
        assert_eq!(gw.db.list_presence().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_nickname_touches_nothing() {
        let gw = gateway();
        let (conn, _rx) = gw.dispatcher.register().await;

        for bad in [" chef", "chef ", "chef_99", "Ωmega", ""] {
            let outcome = gw.authenticate(conn, credentials(bad, "pw")).await.unwrap();
            assert!(matches!(outcome, Outcome::Ignored), "{bad:?} was not ignored");
        }

        assert!(gw.db.list_presence().unwrap().is_empty());
        assert_eq!(gw.dispatcher.session(conn).await, Session::Anonymous);
    }

    #[tokio::test]
    async fn second_authenticate_on_a_session_is_ignored() {
        let gw = gateway();
        let (conn, _rx) = gw.dispatcher.register().await;

        let first = gw.authenticate(conn, credentials("chef99", "pw1")).await.unwrap();
        assert!(matches!(first, Outcome::Applied(_)));

        let second = gw.authenticate(conn, credentials("other", "pw")).await.unwrap();
        assert!(matches!(second, Outcome::Ignored));
        assert!(gw.dispatcher.session(conn).await.owns("chef99"));
        assert!(gw.db.find_user("other").unwrap().is_none());
    }

    #[tokio::test]
    async fn sign_out_of_anonymous_session_is_a_no_op() {
        let gw = gateway();
        let outcome = gw.sign_out(Session::Anonymous).await.unwrap();
        assert!(matches!(outcome, Outcome::Ignored));
    }

    #[tokio::test]
    async fn password_change_requires_owning_session() {
        let gw = gateway();
        let (owner, _rx) = gw.dispatcher.register().await;
        let (stranger, _rx2) = gw.dispatcher.register().await;
        gw.authenticate(owner, credentials("chef99", "pw1")).await.unwrap();

        let change = PasswordChange {
            nickname: "chef99".into(),
            current_password: "pw1".into(),
            new_password: "pw2".into(),
        };
        let outcome = gw.update_password(stranger, change.clone()).await.unwrap();
        assert!(matches!(outcome, Outcome::Ignored));

        let outcome = gw.update_password(owner, change).await.unwrap();
        assert_eq!(
            outcome.into_deliveries(),
            vec![Delivery::Caller(ServerEvent::PasswordUpdated)]
        );

        let digest = gw.db.find_user("chef99").unwrap().unwrap().password;
        assert!(password::verify("pw2", &digest).unwrap());
    }

    #[tokio::test]
    async fn wrong_current_password_is_rejected() {
        let gw = gateway();
        let (conn, _rx) = gw.dispatcher.register().await;
        gw.authenticate(conn, credentials("chef99", "pw1")).await.unwrap();

        let outcome = gw
            .update_password(
                conn,
                PasswordChange {
                    nickname: "chef99".into(),
                    current_password: "nope".into(),
                    new_password: "pw2".into(),
                },
            )
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Rejected(ServerEvent::IncorrectCurrentPassword)
        ));

        let digest = gw.db.find_user("chef99").unwrap().unwrap().password;
        assert!(password::verify("pw1", &digest).unwrap());
    }

    #[tokio::test]
    async fn account_deletion_requires_owning_session() {
        let gw = gateway();
        let (owner, _rx) = gw.dispatcher.register().await;
        let (stranger, _rx2) = gw.dispatcher.register().await;
        gw.authenticate(owner, credentials("chef99", "pw1")).await.unwrap();

        let outcome = gw.delete_account(stranger, "chef99".into()).await.unwrap();
        assert!(matches!(outcome, Outcome::Ignored));
        assert!(gw.db.find_user("chef99").unwrap().is_some());

        gw.delete_account(owner, "chef99".into()).await.unwrap();
        assert!(gw.db.find_user("chef99").unwrap().is_none());
        assert_eq!(gw.dispatcher.session(owner).await, Session::Anonymous);
    }
}
