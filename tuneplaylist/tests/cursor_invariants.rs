//! Exhaustive checks of the playlist cursor arithmetic.

use tuneplaylist::Playlist;
use tunesource::Song;

fn song(n: usize) -> Song {
    let id = format!("s{}", n);
    Song::local(id.clone(), id.clone(), "Artist", "Album", 30.0, format!("/m/{}.mp3", id))
}

fn playlist_of(len: usize, cursor: usize) -> Playlist {
    let mut playlist = Playlist::from_songs((0..len).map(song).collect());
    if len > 0 {
        playlist.select(cursor);
    }
    playlist
}

fn ids(playlist: &Playlist) -> Vec<String> {
    playlist.songs().iter().map(|s| s.id().to_string()).collect()
}

fn assert_cursor_in_bounds(playlist: &Playlist) {
    if playlist.is_empty() {
        assert!(playlist.current_song().is_none());
    } else {
        assert!(
            playlist.current_index() < playlist.len(),
            "cursor {} out of bounds for {} songs",
            playlist.current_index(),
            playlist.len()
        );
    }
}

#[test]
fn move_preserves_current_song_for_every_position() {
    for len in 1..=6 {
        for cursor in 0..len {
            for from in 0..len {
                for to in 0..len {
                    let mut playlist = playlist_of(len, cursor);
                    let current = playlist.current_song().cloned();

                    let mut expected = ids(&playlist);
                    let moved = expected.remove(from);
                    expected.insert(to, moved);

                    assert!(playlist.move_song(from, to));
                    assert_eq!(ids(&playlist), expected, "len={len} from={from} to={to}");
                    assert_eq!(
                        playlist.current_song().cloned(),
                        current,
                        "len={len} cursor={cursor} from={from} to={to}"
                    );
                    assert_cursor_in_bounds(&playlist);
                }
            }
        }
    }
}

#[test]
fn move_out_of_range_never_changes_anything() {
    for len in 0..=4 {
        for cursor in 0..len.max(1) {
            for (from, to) in [(len, 0), (0, len), (len + 3, len + 3)] {
                let mut playlist = playlist_of(len, cursor);
                let before = ids(&playlist);
                let index = playlist.current_index();

                assert!(!playlist.move_song(from, to));
                assert_eq!(ids(&playlist), before);
                assert_eq!(playlist.current_index(), index);
            }
        }
    }
}

#[test]
fn remove_follows_documented_cursor_rule() {
    for len in 1..=6 {
        for cursor in 0..len {
            for index in 0..len {
                let mut playlist = playlist_of(len, cursor);
                let current = playlist.current_song().cloned();

                let removed = playlist.remove(index);
                assert_eq!(removed, Some(song(index)));

                let expected_cursor = if index <= cursor && cursor > 0 {
                    cursor - 1
                } else {
                    cursor
                };
                assert_eq!(
                    playlist.current_index(),
                    expected_cursor,
                    "len={len} cursor={cursor} index={index}"
                );
                assert_cursor_in_bounds(&playlist);

                if index != cursor {
                    assert_eq!(playlist.current_song().cloned(), current);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Add,
    Remove(usize),
    Move(usize, usize),
    Next,
    Previous,
    Select(usize),
    Clear,
}

fn alphabet() -> Vec<Op> {
    let mut ops = vec![Op::Add, Op::Next, Op::Previous, Op::Clear];
    for i in 0..3 {
        ops.push(Op::Remove(i));
        ops.push(Op::Select(i));
        for j in 0..3 {
            ops.push(Op::Move(i, j));
        }
    }
    ops
}

fn apply(playlist: &mut Playlist, op: Op, counter: &mut usize) {
    match op {
        Op::Add => {
            playlist.add(song(*counter));
            *counter += 1;
        }
        Op::Remove(i) => {
            playlist.remove(i);
        }
        Op::Move(i, j) => {
            playlist.move_song(i, j);
        }
        Op::Next => {
            playlist.next();
        }
        Op::Previous => {
            playlist.previous();
        }
        Op::Select(i) => {
            playlist.select(i);
        }
        Op::Clear => playlist.clear(),
    }
}

fn explore(playlist: &Playlist, ops: &[Op], depth: usize, counter: usize) {
    if depth == 0 {
        return;
    }
    for op in ops {
        let mut next = playlist.clone();
        let mut counter = counter;
        apply(&mut next, *op, &mut counter);
        assert_cursor_in_bounds(&next);
        explore(&next, ops, depth - 1, counter);
    }
}

/// Every sequence of up to four operations, starting from a playlist of two
/// songs, keeps the cursor on an existing entry.
#[test]
fn cursor_stays_in_bounds_for_all_short_sequences() {
    explore(&playlist_of(2, 1), &alphabet(), 4, 100);
}
