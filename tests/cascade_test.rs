mod helpers;

use helpers::{count_relations, read_counter, seed_post, seed_user, test_db};
use roost::social::error::SocialError;
use roost::social::toggle::toggle;
use roost::social::types::RelationKind;
use roost::social::{follows, messages, posts, relations, users};

#[test]
fn deleting_a_user_removes_only_their_records() {
    let mut conn = test_db();
    let alice = seed_user(&conn, "alice");
    let bob = seed_user(&conn, "bob");
    let carol = seed_user(&conn, "carol");
    let bobs_post = seed_post(&conn, &bob, "bob's post");

    toggle(&mut conn, RelationKind::Like, &alice, &bobs_post).unwrap();
    toggle(&mut conn, RelationKind::Like, &carol, &bobs_post).unwrap();
    toggle(&mut conn, RelationKind::Bookmark, &alice, &bobs_post).unwrap();

    users::delete_user(&mut conn, &alice).unwrap();

    // Carol's like survives; both of alice's reactions are gone and the
    // counters followed them down.
    assert_eq!(count_relations(&conn, "like", &bobs_post), 1);
    assert_eq!(read_counter(&conn, &bobs_post, "like_count"), 1);
    assert_eq!(count_relations(&conn, "bookmark", &bobs_post), 0);
    assert_eq!(read_counter(&conn, &bobs_post, "bookmark_count"), 0);
}

#[test]
fn deleting_a_user_cascades_posts_follows_and_messages() {
    let mut conn = test_db();
    let alice = seed_user(&conn, "alice");
    let bob = seed_user(&conn, "bob");
    let alices_post = seed_post(&conn, &alice, "alice's post");

    toggle(&mut conn, RelationKind::Like, &bob, &alices_post).unwrap();
    follows::follow(&conn, &alice, &bob).unwrap();
    follows::follow(&conn, &bob, &alice).unwrap();
    messages::send_message(
        &conn,
        &alice,
        &bob,
        messages::NewMessage { body: "hi".into() },
    )
    .unwrap();
    messages::send_message(
        &conn,
        &bob,
        &alice,
        messages::NewMessage { body: "hi back".into() },
    )
    .unwrap();

    users::delete_user(&mut conn, &alice).unwrap();

    // The post went with the account, taking bob's like-relation along
    assert!(matches!(
        posts::find_post(&conn, &alices_post).unwrap_err(),
        SocialError::PostNotFound(_)
    ));
    assert_eq!(count_relations(&conn, "like", &alices_post), 0);

    // No follow edge or message touching alice remains
    assert!(follows::followers(&conn, &bob).unwrap().is_empty());
    assert!(follows::following(&conn, &bob).unwrap().is_empty());
    assert!(messages::messages_sent(&conn, &bob).unwrap().is_empty());
    assert!(messages::messages_received(&conn, &bob).unwrap().is_empty());

    // Bob himself is untouched
    assert_eq!(users::find_user(&conn, &bob).unwrap().username, "bob");
}

#[test]
fn deleting_a_post_removes_its_relations() {
    let mut conn = test_db();
    let alice = seed_user(&conn, "alice");
    let bob = seed_user(&conn, "bob");
    let post = seed_post(&conn, &alice, "to be deleted");
    let other = seed_post(&conn, &alice, "survivor");

    toggle(&mut conn, RelationKind::Like, &bob, &post).unwrap();
    toggle(&mut conn, RelationKind::Like, &bob, &other).unwrap();

    posts::delete_post(&mut conn, &post).unwrap();

    assert_eq!(count_relations(&conn, "like", &post), 0);
    // The other post's reaction is untouched
    assert_eq!(count_relations(&conn, "like", &other), 1);
    assert_eq!(read_counter(&conn, &other, "like_count"), 1);
}

#[test]
fn clearing_one_kind_leaves_the_others() {
    let mut conn = test_db();
    let alice = seed_user(&conn, "alice");
    let p1 = seed_post(&conn, &alice, "one");
    let p2 = seed_post(&conn, &alice, "two");

    toggle(&mut conn, RelationKind::Bookmark, &alice, &p1).unwrap();
    toggle(&mut conn, RelationKind::Bookmark, &alice, &p2).unwrap();
    toggle(&mut conn, RelationKind::Like, &alice, &p1).unwrap();

    let removed = relations::clear_actor_relations(&mut conn, RelationKind::Bookmark, &alice)
        .unwrap();
    assert_eq!(removed, 2);

    assert_eq!(read_counter(&conn, &p1, "bookmark_count"), 0);
    assert_eq!(read_counter(&conn, &p2, "bookmark_count"), 0);
    assert_eq!(read_counter(&conn, &p1, "like_count"), 1);
    assert_eq!(count_relations(&conn, "like", &p1), 1);
}

#[test]
fn counters_stay_exact_across_mixed_cleanup() {
    let mut conn = test_db();
    let actors: Vec<String> = ["a", "b", "c"]
        .iter()
        .map(|name| seed_user(&conn, name))
        .collect();
    let post = seed_post(&conn, &actors[0], "hub");

    for actor in &actors {
        toggle(&mut conn, RelationKind::Like, actor, &post).unwrap();
        toggle(&mut conn, RelationKind::Dislike, actor, &post).unwrap();
    }

    users::delete_user(&mut conn, &actors[1]).unwrap();
    relations::clear_actor_relations(&mut conn, RelationKind::Dislike, &actors[2]).unwrap();

    for kind in RelationKind::ALL {
        assert_eq!(
            read_counter(&conn, &post, kind.counter_column()),
            count_relations(&conn, kind.as_str(), &post),
            "{kind} counter must match rows after cleanup"
        );
    }
}
