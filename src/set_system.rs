use std::io::BufRead;

use crate::error::ParseError;
use crate::schema::RelationSchema;
use crate::vertical::Vertical;

/// A set system read from text: a schema with columns `1..=n` and the target verticals.
///
/// The format follows the DIMACS conventions:
///
/// ```text
/// c comment
/// p hs <columns> <targets>
/// 1 2
/// 2 3
/// ```
///
/// Every line after the p-line lists the 1-based columns of one target.
pub struct SetSystem {
    schema: RelationSchema,
    targets: Vec<Vertical>,
}

impl SetSystem {
    pub fn from_stdin() -> Result<SetSystem, ParseError> {
        SetSystem::parse(std::io::stdin().lock())
    }

    pub fn parse(reader: impl BufRead) -> Result<SetSystem, ParseError> {
        let mut header: Option<(RelationSchema, usize)> = None;
        let mut targets = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = lineno + 1;
            let ll: Vec<&str> = line.split_whitespace().collect();
            match ll.first().copied() {
                None | Some("c") => {} // skip blanks and comments
                Some("p") => { // parse header
                    if header.is_some() {
                        return Err(ParseError::DuplicateHeader { line: line_number });
                    }
                    if ll.len() != 4 || ll[1] != "hs" {
                        return Err(ParseError::MalformedHeader { line: line_number });
                    }
                    let n = parse_number(ll[2], line_number)?;
                    let m = parse_number(ll[3], line_number)?;
                    let schema = RelationSchema::with_columns("stdin", (1..=n).map(|i| i.to_string()))
                        .map_err(|_| ParseError::MalformedHeader { line: line_number })?;
                    header = Some((schema, m));
                }
                Some(_) => { // parse target
                    let Some((schema, _)) = &header else {
                        return Err(ParseError::TargetBeforeHeader { line: line_number });
                    };
                    let mut columns = Vec::with_capacity(ll.len());
                    for token in ll {
                        let column = parse_number(token, line_number)?;
                        if column == 0 || column > schema.num_columns() {
                            return Err(ParseError::ColumnOutOfRange {
                                line: line_number,
                                column,
                                num_columns: schema.num_columns(),
                            });
                        }
                        columns.push(column - 1);
                    }
                    targets.push(schema.vertical(columns));
                }
            }
        }
        match header {
            Some((schema, declared)) => {
                if declared != targets.len() {
                    return Err(ParseError::TargetCountMismatch { declared, found: targets.len() });
                }
                Ok(SetSystem { schema, targets })
            }
            None => Err(ParseError::MissingHeader),
        }
    }

    pub fn schema(&self) -> &RelationSchema {
        &self.schema
    }

    pub fn targets(&self) -> &[Vertical] {
        &self.targets
    }
}

fn parse_number(token: &str, line: usize) -> Result<usize, ParseError> {
    token.parse::<usize>().map_err(|source| ParseError::InvalidNumber { line, source })
}
