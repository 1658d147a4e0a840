use anyhow::{Context, Result, bail};
use tilegrid_core as game;

/// Parses a move string such as `"LLU rd"`, whitespace is ignored.
pub(crate) fn parse_moves(moves: &str) -> Result<Vec<game::Direction>> {
    use game::Direction::*;

    moves
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            Ok(match c.to_ascii_uppercase() {
                'L' => Left,
                'R' => Right,
                'U' => Up,
                'D' => Down,
                other => bail!("unknown move {:?}, expected one of L R U D", other),
            })
        })
        .collect()
}

fn parse_coords(text: &str) -> Result<game::Coord2> {
    let (row, col) = text
        .split_once(',')
        .with_context(|| format!("expected `row,col`, got {:?}", text))?;
    let row = row.trim().parse().with_context(|| format!("bad row in {:?}", text))?;
    let col = col.trim().parse().with_context(|| format!("bad column in {:?}", text))?;
    Ok((row, col))
}

/// Parses one `r,c:r,c` swap.
pub(crate) fn parse_swap(token: &str) -> Result<game::SwapAction> {
    let (a, b) = token
        .split_once(':')
        .with_context(|| format!("expected `r,c:r,c`, got {:?}", token))?;
    Ok(game::SwapAction::Swap(parse_coords(a)?, parse_coords(b)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use game::Direction::*;

    #[test]
    fn moves_ignore_case_and_whitespace() {
        assert_eq!(parse_moves("Lr u\tD").unwrap(), vec![Left, Right, Up, Down]);
        assert!(parse_moves("").unwrap().is_empty());
    }

    #[test]
    fn unknown_move_is_rejected() {
        let err = parse_moves("LX").unwrap_err();
        assert!(err.to_string().contains("'X'"));
    }

    #[test]
    fn swap_pairs_parse() {
        assert_eq!(
            parse_swap("2,0:2,1").unwrap(),
            game::SwapAction::Swap((2, 0), (2, 1))
        );
        assert_eq!(
            parse_swap(" 3, 4 : 4,4").unwrap(),
            game::SwapAction::Swap((3, 4), (4, 4))
        );
    }

    #[test]
    fn malformed_swaps_are_rejected() {
        assert!(parse_swap("2,0").is_err());
        assert!(parse_swap("2;0:2,1").is_err());
        assert!(parse_swap("a,0:2,1").is_err());
        assert!(parse_swap("300,0:2,1").is_err());
    }
}
