use crate::Database;
use crate::models::{PresenceRow, RecipeRow, UserInsert, UserRow};
use anyhow::Result;
use rusqlite::{Connection, Row};

impl Database {
    // -- Users --

    pub fn find_user(&self, name: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_name(conn, name))
    }

    /// Insert a new user, already marked online.
    ///
    /// A concurrent signup that won the race for `name` shows up as
    /// `UserInsert::NameTaken`, not as an error.
    pub fn create_user(&self, name: &str, password_hash: &str) -> Result<UserInsert> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (name, password, is_online) VALUES (?1, ?2, 1)",
                (name, password_hash),
            );

            match inserted {
                Ok(_) => Ok(UserInsert::Created(conn.last_insert_rowid())),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
                {
                    Ok(UserInsert::NameTaken)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn set_online(&self, name: &str, online: bool) -> Result<usize> {
        self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE users SET is_online = ?1 WHERE name = ?2",
                (online, name),
            )?)
        })
    }

    pub fn update_password(&self, name: &str, password_hash: &str) -> Result<usize> {
        self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE users SET password = ?1 WHERE name = ?2",
                (password_hash, name),
            )?)
        })
    }

    pub fn delete_user(&self, name: &str) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM users WHERE name = ?1", [name])?))
    }

    /// Every user with presence, online first, then in signup order.
    pub fn list_presence(&self) -> Result<Vec<PresenceRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT name, is_online FROM users ORDER BY is_online DESC, id ASC")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(PresenceRow {
                        name: row.get(0)?,
                        is_online: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Recipes --

    pub fn insert_recipe(
        &self,
        op: &str,
        title: &str,
        instructions: &str,
        image_urls: &str,
        time: &str,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO recipes (op, title, instructions, image_urls, time) VALUES (?1, ?2, ?3, ?4, ?5)",
                (op, title, instructions, image_urls, time),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Rewrite every recipe equal to the match key on all four fields.
    /// `time` is never rewritten. Returns the number of rows touched, which
    /// may be zero or more than one.
    #[allow(clippy::too_many_arguments)]
    pub fn update_recipes(
        &self,
        key_op: &str,
        key_title: &str,
        key_instructions: &str,
        key_time: &str,
        title: &str,
        instructions: &str,
        image_urls: &str,
    ) -> Result<usize> {
        self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE recipes SET title = ?1, instructions = ?2, image_urls = ?3
                 WHERE op = ?4 AND title = ?5 AND instructions = ?6 AND time = ?7",
                rusqlite::params![
                    title,
                    instructions,
                    image_urls,
                    key_op,
                    key_title,
                    key_instructions,
                    key_time
                ],
            )?)
        })
    }

    /// Delete by title alone, whoever posted it.
    pub fn delete_recipes_by_title(&self, title: &str) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM recipes WHERE title = ?1", [title])?))
    }

    /// Blank the author of every recipe posted by `op`.
    pub fn orphan_recipes(&self, op: &str) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("UPDATE recipes SET op = '' WHERE op = ?1", [op])?))
    }

    /// Recipes in creation order; `None` returns them all.
    pub fn recent_recipes(&self, limit: Option<u32>) -> Result<Vec<RecipeRow>> {
        // SQLite treats a negative LIMIT as no limit
        let limit = limit.map_or(-1, i64::from);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, op, title, instructions, image_urls, time
                 FROM recipes
                 ORDER BY time ASC, id ASC
                 LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit], recipe_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn recipes_by_op(&self, op: &str) -> Result<Vec<RecipeRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, op, title, instructions, image_urls, time
                 FROM recipes
                 WHERE op = ?1
                 ORDER BY time ASC, id ASC",
            )?;
            let rows = stmt
                .query_map([op], recipe_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user_by_name(conn: &Connection, name: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, name, password, is_online FROM users WHERE name = ?1")?;

    let row = stmt
        .query_row([name], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                name: row.get(1)?,
                password: row.get(2)?,
                is_online: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn recipe_from_row(row: &Row<'_>) -> rusqlite::Result<RecipeRow> {
    Ok(RecipeRow {
        id: row.get(0)?,
        op: row.get(1)?,
        title: row.get(2)?,
        instructions: row.get(3)?,
        image_urls: row.get(4)?,
        time: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn duplicate_name_is_reported_not_raised() {
        let db = db();
        assert!(matches!(db.create_user("chef99", "h1").unwrap(), UserInsert::Created(_)));
        assert_eq!(db.create_user("chef99", "h2").unwrap(), UserInsert::NameTaken);

        let user = db.find_user("chef99").unwrap().unwrap();
        assert_eq!(user.password, "h1");
        assert!(user.is_online);
    }

    #[test]
    fn names_are_case_sensitive() {
        let db = db();
        db.create_user("Chef", "h").unwrap();
        assert!(matches!(db.create_user("chef", "h").unwrap(), UserInsert::Created(_)));
        assert!(db.find_user("CHEF").unwrap().is_none());
    }

    #[test]
    fn presence_lists_online_users_first() {
        let db = db();
        db.create_user("ann", "h").unwrap();
        db.create_user("bob", "h").unwrap();
        db.create_user("cat", "h").unwrap();
        db.set_online("ann", false).unwrap();
        db.set_online("cat", false).unwrap();

        let names: Vec<_> = db.list_presence().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["bob", "ann", "cat"]);
    }

    #[test]
    fn update_hits_every_row_equal_to_the_match_key() {
        let db = db();
        let t = "2026-01-02 03:04:05";
        db.insert_recipe("chef99", "Soup", "Boil", "[]", t).unwrap();
        db.insert_recipe("chef99", "Soup", "Boil", "[]", t).unwrap();
        db.insert_recipe("chef99", "Soup", "Simmer", "[]", t).unwrap();

        let touched = db
            .update_recipes("chef99", "Soup", "Boil", t, "Stew", "Boil", "[]")
            .unwrap();
        assert_eq!(touched, 2);

        let titles: Vec<_> = db.recent_recipes(None).unwrap().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, ["Stew", "Stew", "Soup"]);
    }

    #[test]
    fn stale_match_key_touches_nothing() {
        let db = db();
        db.insert_recipe("chef99", "Soup", "Boil", "[]", "2026-01-02 03:04:05").unwrap();
        let touched = db
            .update_recipes("chef99", "Soup", "Boil", "2026-01-02 03:04:06", "Stew", "Boil", "[]")
            .unwrap();
        assert_eq!(touched, 0);
    }

    #[test]
    fn delete_by_title_ignores_author() {
        let db = db();
        db.insert_recipe("ann", "Soup", "a", "[]", "2026-01-01 00:00:00").unwrap();
        db.insert_recipe("bob", "Soup", "b", "[]", "2026-01-01 00:00:01").unwrap();
        db.insert_recipe("bob", "Cake", "c", "[]", "2026-01-01 00:00:02").unwrap();

        assert_eq!(db.delete_recipes_by_title("Soup").unwrap(), 2);
        assert_eq!(db.recent_recipes(None).unwrap().len(), 1);
    }

    #[test]
    fn orphaning_keeps_recipes() {
        let db = db();
        db.insert_recipe("ann", "Soup", "a", "[]", "2026-01-01 00:00:00").unwrap();
        assert_eq!(db.orphan_recipes("ann").unwrap(), 1);

        let rows = db.recent_recipes(None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].op, "");
        assert!(db.recipes_by_op("ann").unwrap().is_empty());
    }

    #[test]
    fn recent_recipes_orders_by_time_and_limits() {
        let db = db();
        db.insert_recipe("ann", "B", "", "[]", "2026-01-01 00:00:02").unwrap();
        db.insert_recipe("ann", "A", "", "[]", "2026-01-01 00:00:01").unwrap();
        db.insert_recipe("ann", "C", "", "[]", "2026-01-01 00:00:03").unwrap();

        let titles: Vec<_> = db.recent_recipes(Some(2)).unwrap().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, ["A", "B"]);
    }

    #[test]
    fn overlong_title_is_refused_by_the_store() {
        let db = db();
        let title = "x".repeat(65);
        assert!(db.insert_recipe("ann", &title, "", "[]", "2026-01-01 00:00:00").is_err());
    }
}
