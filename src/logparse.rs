//! Minecraft server log parsing.
//!
//! Turns raw multi-line log text into a typed sequence of events. The parser
//! is pure: no side effects and no access to the store. Parsing the same
//! text twice yields the same events; *applying* them twice is not
//! idempotent, which is the caller's problem, not the parser's.
//!
//! Each line is run through an ordered list of matchers, first match wins,
//! in precedence order: join, leave, pvp-kill, zombie-death, fall/other.
//! The pvp matcher defers to the zombie matcher when the killer token is
//! `Zombie`/`zombie`, which keeps the two shapes mutually exclusive.

/// One typed event extracted from a log line, carrying the in-log
/// `HH:MM:SS` timestamp string and the relevant player name(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    Join {
        time: String,
        player: String,
    },
    Leave {
        time: String,
        player: String,
    },
    PvpKill {
        time: String,
        killer: String,
        victim: String,
    },
    ZombieDeath {
        time: String,
        player: String,
    },
    /// Fall damage or any other generic death line
    FallDeath {
        time: String,
        player: String,
    },
}

/// Parse raw log text (arbitrary line endings) into an event sequence.
/// Lines matching no pattern produce no event.
pub fn parse_log(content: &str) -> Vec<LogEvent> {
    content.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<LogEvent> {
    let (time, rest) = split_timestamp(line)?;
    let time = time.to_string();

    if let Some(player) = player_before(rest, "joined the game") {
        return Some(LogEvent::Join { time, player });
    }
    if let Some(player) = player_before(rest, "left the game") {
        return Some(LogEvent::Leave { time, player });
    }
    if let Some((victim, killer)) = kill_parts(rest) {
        if killer == "Zombie" || killer == "zombie" {
            return Some(LogEvent::ZombieDeath {
                time,
                player: victim,
            });
        }
        return Some(LogEvent::PvpKill {
            time,
            killer,
            victim,
        });
    }
    if let Some(player) = player_before(rest, "fell").or_else(|| player_before(rest, "died")) {
        return Some(LogEvent::FallDeath { time, player });
    }
    None
}

/// Find a `[HH:MM:SS]` stamp anywhere in the line; returns the stamp and the
/// remainder of the line after it.
fn split_timestamp(line: &str) -> Option<(&str, &str)> {
    for (start, _) in line.match_indices('[') {
        // Non-ASCII text before the stamp can put this slice on a char
        // boundary that doesn't exist; that only disqualifies this `[`,
        // not the rest of the line.
        let Some(stamp) = line.get(start + 1..start + 9) else {
            continue;
        };
        if line.as_bytes().get(start + 9) == Some(&b']') && is_clock(stamp) {
            return Some((stamp, &line[start + 10..]));
        }
    }
    None
}

fn is_clock(stamp: &str) -> bool {
    let bytes = stamp.as_bytes();
    bytes.len() == 8
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 2 || i == 5 { *b == b':' } else { b.is_ascii_digit() })
}

/// The player name token preceding `marker`, requiring whitespace between
/// the name and the marker. Scans every occurrence of the marker so a
/// non-matching earlier occurrence does not mask a later one.
fn player_before(text: &str, marker: &str) -> Option<String> {
    for (idx, _) in text.match_indices(marker) {
        let head = &text[..idx];
        let trimmed = head.trim_end();
        if trimmed.len() == head.len() {
            continue; // no whitespace gap, not a standalone marker
        }
        let name = trailing_name(trimmed);
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }
    None
}

/// Split `"<victim> was slain by <killer>"` (or `killed`) into its names.
fn kill_parts(text: &str) -> Option<(String, String)> {
    for marker in [" was slain by ", " was killed by "] {
        if let Some(idx) = text.find(marker) {
            let victim = trailing_name(&text[..idx]);
            let killer = leading_name(&text[idx + marker.len()..]);
            if !victim.is_empty() && !killer.is_empty() {
                return Some((victim.to_string(), killer.to_string()));
            }
        }
    }
    None
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Longest run of name characters at the end of `text`.
fn trailing_name(text: &str) -> &str {
    let start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_name_char(*c))
        .last()
        .map(|(i, _)| i);
    match start {
        Some(i) => &text[i..],
        None => "",
    }
}

/// Longest run of name characters at the start of `text`.
fn leading_name(text: &str) -> &str {
    let end = text
        .char_indices()
        .find(|(_, c)| !is_name_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    &text[..end]
}
