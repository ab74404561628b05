use speculate2::speculate;

speculate! {
    use featurevote_core::models::*;
    use featurevote_core::seed::{load_sample_data, SAMPLE_FEATURES};
    use featurevote_core::{Database, Error};

    fn setup_db() -> Database {
        let db = Database::open_memory().expect("Failed to create test database");
        db.migrate().expect("Failed to migrate test database");
        db
    }

    fn create_user(db: &Database, username: &str) -> User {
        db.create_user(CreateUserInput { username: username.into(), email: None })
            .expect("Failed to create user")
    }

    fn create_feature(db: &Database, author: &User, title: &str) -> Feature {
        db.create_feature(author.id, CreateFeatureInput { title: title.into(), description: None })
            .expect("Failed to create feature")
    }

    fn set_created_at(db: &Database, feature: &Feature, created_at: &str) {
        db.with_connection(|conn| {
            conn.execute(
                "UPDATE features SET created_at = ?1 WHERE id = ?2",
                [created_at.to_string(), feature.id.to_string()],
            )?;
            Ok(())
        })
        .unwrap();
    }

    fn vote_n(db: &Database, feature: &Feature, voters: &[User], n: usize) {
        for voter in voters.iter().take(n) {
            db.cast_vote(feature.id, voter.id).unwrap();
        }
    }

    describe "ranked_all" {
        it "orders by votes then newest first" {
            let db = setup_db();
            let author = create_user(&db, "author");
            let voters: Vec<User> = (0..10).map(|i| create_user(&db, &format!("voter{}", i))).collect();

            let top = create_feature(&db, &author, "Ten votes");
            let older = create_feature(&db, &author, "Older five");
            let newer = create_feature(&db, &author, "Newer five");
            set_created_at(&db, &top, "2024-01-01T00:00:00.000000Z");
            set_created_at(&db, &older, "2024-01-02T00:00:00.000000Z");
            set_created_at(&db, &newer, "2024-01-03T00:00:00.000000Z");

            vote_n(&db, &top, &voters, 10);
            vote_n(&db, &older, &voters, 5);
            vote_n(&db, &newer, &voters, 5);

            let ranked: Vec<_> = db.ranked_all().unwrap().into_iter().map(|f| f.id).collect();
            assert_eq!(ranked, vec![top.id, newer.id, older.id]);
        }

        it "uses creation time rather than insertion order on ties" {
            let db = setup_db();
            let author = create_user(&db, "author");

            let inserted_first = create_feature(&db, &author, "Inserted first");
            let inserted_second = create_feature(&db, &author, "Inserted second");
            set_created_at(&db, &inserted_first, "2024-06-01T00:00:00.000000Z");
            set_created_at(&db, &inserted_second, "2024-05-01T00:00:00.000000Z");

            let ranked = db.ranked_all().unwrap();
            assert_eq!(ranked[0].id, inserted_first.id);
            assert_eq!(ranked[1].id, inserted_second.id);
        }

        it "returns an empty list when there are no features" {
            let db = setup_db();
            assert!(db.ranked_all().unwrap().is_empty());
        }
    }

    describe "ranked_features" {
        it "pages through the ranking" {
            let db = setup_db();
            let author = create_user(&db, "author");
            for i in 0..5 {
                create_feature(&db, &author, &format!("Feature {}", i));
            }

            let first = db.ranked_features(PageRequest { page: 1, page_size: 2 }, None).unwrap();
            let last = db.ranked_features(PageRequest { page: 3, page_size: 2 }, None).unwrap();

            assert_eq!(first.count, 5);
            assert_eq!(first.results.len(), 2);
            assert_eq!(last.results.len(), 1);
            assert_eq!(last.results[0].feature.title, "Feature 0");
        }

        it "marks the viewer's own votes" {
            let db = setup_db();
            let author = create_user(&db, "author");
            let voter = create_user(&db, "voter");
            let voted = create_feature(&db, &author, "Voted");
            create_feature(&db, &author, "Not voted");
            db.cast_vote(voted.id, voter.id).unwrap();

            let page = db.ranked_features(PageRequest::default(), Some(voter.id)).unwrap();

            assert_eq!(page.results[0].feature.id, voted.id);
            assert!(page.results[0].has_voted);
            assert!(!page.results[1].has_voted);
        }

        it "returns an empty first page for an empty store" {
            let db = setup_db();
            let page = db.ranked_features(PageRequest::default(), None).unwrap();
            assert_eq!(page.count, 0);
            assert!(page.results.is_empty());
        }

        it "rejects pages past the end" {
            let db = setup_db();
            let author = create_user(&db, "author");
            create_feature(&db, &author, "Only");

            let result = db.ranked_features(PageRequest { page: 2, page_size: 20 }, None);

            assert!(matches!(result, Err(Error::NotFound(_))));
        }

        it "rejects a zero page" {
            let db = setup_db();
            let result = db.ranked_features(PageRequest { page: 0, page_size: 20 }, None);
            assert!(matches!(result, Err(Error::Validation(_))));
        }

        it "rejects a zero page size" {
            let db = setup_db();
            let author = create_user(&db, "author");
            create_feature(&db, &author, "Only");

            let result = db.ranked_features(PageRequest { page: 1, page_size: 0 }, None);

            assert!(matches!(result, Err(Error::Validation(_))));
        }
    }

    describe "sample data" {
        it "loads ranked sample features once" {
            let db = setup_db();

            let first = load_sample_data(&db).unwrap();
            let second = load_sample_data(&db).unwrap();

            assert_eq!(first.features_created, SAMPLE_FEATURES.len());
            assert_eq!(first.votes_cast, SAMPLE_FEATURES.iter().map(|f| f.votes).sum::<usize>());
            assert_eq!(second.features_created, 0);
            assert_eq!(second.users_created, 0);

            let ranked = db.ranked_all().unwrap();
            assert_eq!(ranked[0].title, "Mobile App");
            assert_eq!(ranked[0].vote_count, 23);
            assert_eq!(ranked.last().unwrap().title, "User Profiles");
        }
    }
}
