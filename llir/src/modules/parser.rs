use std::{path::Path, str::FromStr};

use chumsky::prelude::*;
use log::{debug, info};
use strum::IntoEnumIterator;

use crate::{
    modules::{
        BasicBlock, Function, Module, Param,
        instructions::{Instruction, Opcode},
    },
    types::{
        Type,
        is_ident_char,
        aggregate::{ArrayType, StructType},
        primary::{FType, IType, PtrType, VcType, VectorSize},
    },
    utils::{Error, ParserError},
};

pub fn comment<'src>() -> impl Parser<'src, &'src str, (), extra::Err<Rich<'src, char>>> + Clone {
    just(';')
        .then(none_of("\r\n").repeated())
        .ignored()
        .labelled("comment")
}

/// Whitespace, line breaks and `;` comments, possibly empty.
pub fn whitespace<'src>() -> impl Parser<'src, &'src str, (), extra::Err<Rich<'src, char>>> + Clone
{
    choice((
        any().filter(|c: &char| c.is_whitespace()).ignored(),
        comment(),
    ))
    .repeated()
    .ignored()
}

/// Spaces and tabs only; never crosses a line break.
pub fn inline_whitespace<'src>()
-> impl Parser<'src, &'src str, (), extra::Err<Rich<'src, char>>> + Clone {
    one_of(" \t").repeated().ignored()
}

fn rest_of_line<'src>() -> impl Parser<'src, &'src str, (), extra::Err<Rich<'src, char>>> + Clone {
    none_of("\r\n").repeated().ignored()
}

pub fn word<'src>() -> impl Parser<'src, &'src str, &'src str, extra::Err<Rich<'src, char>>> + Clone
{
    any()
        .filter(is_ident_char)
        .repeated()
        .at_least(1)
        .to_slice()
        .labelled("word")
}

pub fn keyword<'src>(
    kw: &'static str,
) -> impl Parser<'src, &'src str, (), extra::Err<Rich<'src, char>>> + Clone {
    word()
        .filter(move |w: &&str| *w == kw)
        .ignored()
        .labelled(kw)
}

pub fn quoted_string<'src>()
-> impl Parser<'src, &'src str, &'src str, extra::Err<Rich<'src, char>>> + Clone {
    none_of("\"")
        .repeated()
        .to_slice()
        .delimited_by(just('"'), just('"'))
        .labelled("string")
}

/// Name following a `@` or `%` sigil, either bare (`foo.bar`, `12`) or quoted.
pub fn name_parser<'src>()
-> impl Parser<'src, &'src str, String, extra::Err<Rich<'src, char>>> + Clone {
    choice((quoted_string(), word()))
        .map(str::to_string)
        .labelled("identifier")
}

pub fn global_name<'src>()
-> impl Parser<'src, &'src str, String, extra::Err<Rich<'src, char>>> + Clone {
    just('@').ignore_then(name_parser()).labelled("global name")
}

pub fn local_name<'src>()
-> impl Parser<'src, &'src str, String, extra::Err<Rich<'src, char>>> + Clone {
    just('%').ignore_then(name_parser()).labelled("local name")
}

pub fn number<'src, T>() -> impl Parser<'src, &'src str, T, extra::Err<Rich<'src, char>>> + Clone
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    text::int(10)
        .try_map(|digits: &str, span| {
            digits
                .parse::<T>()
                .map_err(|err| Rich::custom(span, format!("invalid number {}: {}", digits, err)))
        })
        .labelled("number")
}

/// Types spelled as a single keyword (`i32`, `double`, `void`, ...).
fn keyword_type(w: &str) -> Result<Type, String> {
    if let Some(ty) = FType::iter().find(|ty| ty.keyword() == w) {
        return Ok(Type::Float(ty));
    }

    match w {
        "void" => Ok(Type::Void),
        "label" => Ok(Type::Label),
        "metadata" => Ok(Type::Metadata),
        "token" => Ok(Type::Token),
        "x86_amx" => Ok(Type::X86Amx),
        _ => match w.strip_prefix('i') {
            Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                digits
                    .parse::<u32>()
                    .ok()
                    .and_then(IType::new)
                    .map(Type::Int)
                    .ok_or_else(|| {
                        format!(
                            "integer type width must be between {} and {}, got {}",
                            IType::MIN_BITS,
                            IType::MAX_BITS,
                            digits
                        )
                    })
            }
            _ => Err(format!("expected a type, found `{}`", w)),
        },
    }
}

pub fn type_parser<'src>() -> impl Parser<'src, &'src str, Type, extra::Err<Rich<'src, char>>> + Clone
{
    recursive(|ty| {
        // `ptr` with an optional `addrspace(N)` suffix
        let ptr_type = keyword("ptr")
            .ignore_then(
                inline_whitespace()
                    .ignore_then(keyword("addrspace"))
                    .ignore_then(number::<u32>().padded().delimited_by(just('('), just(')')))
                    .or_not(),
            )
            .map(|addrspace| {
                Type::Ptr(PtrType {
                    addrspace: addrspace.unwrap_or(0),
                })
            })
            .labelled("pointer type");

        let simple_type = word()
            .try_map(|w: &str, span| keyword_type(w).map_err(|msg| Rich::custom(span, msg)))
            .labelled("primitive type");

        let named_type = local_name().map(Type::Named).labelled("named type");

        // Array type (e.g., [N x T])
        let array_type = number::<u64>()
            .then_ignore(whitespace())
            .then_ignore(keyword("x"))
            .then_ignore(whitespace())
            .then(ty.clone())
            .padded_by(whitespace())
            .delimited_by(just('['), just(']'))
            .map(|(num_elements, elem)| {
                Type::Array(ArrayType {
                    ty: Box::new(elem),
                    num_elements,
                })
            })
            .labelled("array type");

        // Vector type (e.g., <4 x float> or <vscale x 4 x i32>)
        let vector_type = keyword("vscale")
            .then_ignore(whitespace())
            .then_ignore(keyword("x"))
            .then_ignore(whitespace())
            .or_not()
            .then(number::<u32>())
            .then_ignore(whitespace())
            .then_ignore(keyword("x"))
            .then_ignore(whitespace())
            .then(ty.clone())
            .padded_by(whitespace())
            .delimited_by(just('<'), just('>'))
            .map(|((scalable, num), elem)| {
                Type::Vector(VcType {
                    ty: Box::new(elem),
                    size: if scalable.is_some() {
                        VectorSize::Scalable(num)
                    } else {
                        VectorSize::Fixed(num)
                    },
                })
            })
            .labelled("vector type");

        // Struct type (e.g., { T1, T2, T3 })
        let struct_body = ty
            .separated_by(just(',').padded_by(whitespace()))
            .collect::<Vec<_>>()
            .padded_by(whitespace())
            .delimited_by(just('{'), just('}'));

        let packed_struct_type = struct_body
            .clone()
            .padded_by(whitespace())
            .delimited_by(just('<'), just('>'))
            .map(|element_types| {
                Type::Struct(StructType {
                    element_types,
                    packed: true,
                })
            })
            .labelled("packed structure type");

        let struct_type = struct_body
            .map(|element_types| {
                Type::Struct(StructType {
                    element_types,
                    packed: false,
                })
            })
            .labelled("structure type");

        choice((
            ptr_type,
            simple_type,
            named_type,
            array_type,
            packed_struct_type,
            vector_type,
            struct_type,
        ))
        // Legacy typed pointers (e.g., i8**)
        .foldl(
            inline_whitespace().ignore_then(just('*')).repeated(),
            |pointee, _| Type::TypedPtr(Box::new(pointee)),
        )
        .labelled("type")
    })
    .boxed()
}

/// Balanced parenthesized group such as attribute arguments `(i32 0, 10)`.
fn paren_group<'src>() -> impl Parser<'src, &'src str, (), extra::Err<Rich<'src, char>>> + Clone {
    recursive(|group| {
        choice((group, quoted_string().ignored(), none_of("()\"").ignored()))
            .repeated()
            .delimited_by(just('('), just(')'))
            .ignored()
    })
}

/// Balanced bracketed group such as a `switch` jump table; may span lines.
fn bracket_group<'src>() -> impl Parser<'src, &'src str, (), extra::Err<Rich<'src, char>>> + Clone
{
    recursive(|group| {
        choice((group, quoted_string().ignored(), none_of("[]\"").ignored()))
            .repeated()
            .delimited_by(just('['), just(']'))
            .ignored()
    })
}

/// Return type, name and parameter list of a `define` or `declare`.
struct Signature {
    return_type: Type,
    name: String,
    params: Vec<Option<Param>>,
}

impl Signature {
    fn into_function(self, blocks: Vec<BasicBlock>) -> Function {
        let variadic = matches!(self.params.last(), Some(None));
        Function {
            name: self.name,
            return_type: self.return_type,
            params: self.params.into_iter().flatten().collect(),
            variadic,
            blocks,
        }
    }
}

fn param_parser<'src>()
-> impl Parser<'src, &'src str, Option<Param>, extra::Err<Rich<'src, char>>> + Clone {
    // Attributes and the optional name following the parameter type
    let param_token = choice((
        local_name().map(Some),
        paren_group().to(None::<String>),
        quoted_string().to(None::<String>),
        word().to(None::<String>),
    ));

    choice((
        just("...").to(None),
        type_parser()
            .then(
                whitespace()
                    .ignore_then(param_token)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(ty, tokens)| {
                Some(Param {
                    ty,
                    name: tokens.into_iter().flatten().last(),
                })
            }),
    ))
    .labelled("parameter")
}

fn signature_parser<'src>()
-> impl Parser<'src, &'src str, Signature, extra::Err<Rich<'src, char>>> + Clone {
    let head = type_parser()
        .then_ignore(whitespace())
        .then(global_name())
        .labelled("return type and function name");

    // Linkage, visibility, calling convention and return attributes are
    // accepted but not retained.
    let prefix = head
        .clone()
        .not()
        .ignore_then(choice((paren_group(), word().ignored())))
        .then_ignore(whitespace())
        .repeated();

    let params = param_parser()
        .separated_by(just(',').padded_by(whitespace()))
        .collect::<Vec<_>>()
        .padded_by(whitespace())
        .delimited_by(just('('), just(')'))
        .labelled("parameter list");

    prefix
        .ignore_then(head)
        .then_ignore(whitespace())
        .then(params)
        .map(|((return_type, name), params)| Signature {
            return_type,
            name,
            params,
        })
}

#[derive(Debug, Clone, PartialEq)]
enum Line {
    Label(String),
    Instr(Instruction),
    /// `#dbg_value(...)` and similar records; not instructions.
    DebugRecord,
}

fn instruction_parser<'src>()
-> impl Parser<'src, &'src str, Instruction, extra::Err<Rich<'src, char>>> + Clone {
    let dest = local_name()
        .then_ignore(just('=').padded_by(inline_whitespace()))
        .labelled("instruction destination");

    let call_marker = choice((keyword("tail"), keyword("musttail"), keyword("notail")))
        .then_ignore(inline_whitespace());

    let opcode = word()
        .try_map(|w: &str, span| {
            Opcode::from_str(w)
                .map_err(|_| Rich::custom(span, format!("unknown instruction opcode `{}`", w)))
        })
        .labelled("opcode");

    let operand_text = choice((
        bracket_group(),
        quoted_string().ignored(),
        none_of("\r\n;[\"").ignored(),
    ))
    .repeated()
    .to_slice()
    .map(str::trim);

    // `invoke` destinations and `landingpad` clauses are printed on lines of
    // their own. `catch:` and friends are block labels, not clauses.
    let clause = choice((
        keyword("to"),
        keyword("unwind"),
        keyword("cleanup"),
        keyword("catch"),
        keyword("filter"),
    ))
    .then(just(':').not());

    let continuation = whitespace()
        .ignore_then(clause.rewind())
        .ignore_then(operand_text.clone());

    let operands = operand_text
        .then(continuation.repeated().collect::<Vec<_>>())
        .map(|(head, rest)| {
            std::iter::once(head)
                .chain(rest)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        });

    dest.or_not()
        .then_ignore(call_marker.or_not())
        .then(opcode)
        .then_ignore(inline_whitespace())
        .then(operands)
        .map(|((dest, opcode), operands)| Instruction {
            dest,
            opcode,
            operands,
        })
        .labelled("instruction")
}

/// Split a function body into basic blocks.
///
/// A terminator closes the current block and an instruction following it
/// opens a new unlabeled block. A label may only appear once the current
/// block is terminated. Problems are returned with the span they refer to.
fn assemble_blocks(
    lines: Vec<(Line, SimpleSpan)>,
    body: SimpleSpan,
) -> (Vec<BasicBlock>, Vec<(SimpleSpan, String)>) {
    let mut blocks = Vec::new();
    let mut problems = Vec::new();
    let mut current: Option<BasicBlock> = None;

    for (line, span) in lines {
        match line {
            Line::Label(label) => {
                if let Some(open) = current.take() {
                    problems.push((
                        span,
                        format!("expected a terminator before label `{}`", label),
                    ));
                    blocks.push(open);
                }
                current = Some(BasicBlock::new(Some(label)));
            }
            Line::Instr(instr) => {
                let terminates = instr.opcode.is_terminator();
                let block = current.get_or_insert_with(|| BasicBlock::new(None));
                block.instructions.push(instr);
                if terminates {
                    blocks.extend(current.take());
                }
            }
            Line::DebugRecord => {}
        }
    }

    let end: SimpleSpan = (body.end.saturating_sub(1)..body.end).into();
    if let Some(open) = current {
        let what = match &open.label {
            Some(label) => format!("basic block `{}` does not end with a terminator", label),
            None => "basic block does not end with a terminator".to_string(),
        };
        problems.push((end, what));
        blocks.push(open);
    } else if blocks.is_empty() {
        problems.push((
            end,
            "function body requires at least one basic block".to_string(),
        ));
    }

    (blocks, problems)
}

fn body_parser<'src>()
-> impl Parser<'src, &'src str, Vec<BasicBlock>, extra::Err<Rich<'src, char>>> + Clone {
    let label = name_parser()
        .then_ignore(just(':'))
        .map(Line::Label)
        .labelled("block label");

    let debug_record = just('#')
        .ignore_then(word().filter(|w: &&str| w.starts_with("dbg_")))
        .then_ignore(paren_group())
        .then_ignore(rest_of_line())
        .to(Line::DebugRecord)
        .labelled("debug record");

    let line = choice((label, debug_record, instruction_parser().map(Line::Instr)))
        .map_with(|line, e| (line, e.span()));

    line.then_ignore(whitespace())
        .repeated()
        .collect::<Vec<_>>()
        .delimited_by(just('{').then(whitespace()), just('}'))
        .validate(|lines, extra, emitter| {
            let (blocks, problems) = assemble_blocks(lines, extra.span());
            for (span, message) in problems {
                emitter.emit(Rich::custom(span, message));
            }
            blocks
        })
        .labelled("function body")
}

#[derive(Debug, Clone)]
enum Item {
    SourceFilename(String),
    Function(Function),
    Skipped,
}

fn item_parser<'src>() -> impl Parser<'src, &'src str, Item, extra::Err<Rich<'src, char>>> + Clone
{
    let source_filename = keyword("source_filename")
        .then(just('=').padded_by(whitespace()))
        .ignore_then(quoted_string())
        .map(|name| Item::SourceFilename(name.to_string()))
        .labelled("source file name");

    let declare = keyword("declare")
        .then(whitespace())
        .ignore_then(signature_parser())
        .then_ignore(rest_of_line())
        .map(|sig| Item::Function(sig.into_function(Vec::new())))
        .labelled("function declaration");

    let define = keyword("define")
        .then(whitespace())
        .ignore_then(signature_parser())
        // Function attributes, section, personality, metadata attachments...
        .then_ignore(none_of("{").repeated())
        .then(body_parser())
        .map(|(sig, blocks)| Item::Function(sig.into_function(blocks)))
        .labelled("function definition");

    // Top-level entities that carry nothing this crate models
    let skipped = choice((
        keyword("target"),
        keyword("attributes"),
        keyword("module"),
        keyword("uselistorder"),
        keyword("uselistorder_bb"),
        one_of("@%$!^").ignored(),
    ))
    .then(rest_of_line())
    .to(Item::Skipped);

    choice((source_filename, declare, define, skipped)).labelled("top-level entity")
}

fn collect_module(name: &str, items: Vec<Item>) -> Module {
    let mut module = Module::new(name);
    for item in items {
        match item {
            Item::SourceFilename(file) => module.source_file_name = file,
            Item::Function(func) => {
                debug!(
                    "parsed {} `{}` ({} block(s), {} instruction(s))",
                    if func.is_declaration() {
                        "declaration"
                    } else {
                        "definition"
                    },
                    func.name,
                    func.blocks.len(),
                    func.instruction_count()
                );
                module.functions.push(func);
            }
            Item::Skipped => {}
        }
    }
    module
}

fn parse_with_file(name: &str, source: &str, file: Option<&str>) -> Result<Module, Error> {
    let items = whitespace()
        .ignore_then(item_parser().then_ignore(whitespace()).repeated().collect::<Vec<_>>())
        .then_ignore(end())
        .parse(source)
        .into_result()
        .map_err(|errors| Error::ParserErrors {
            errors: errors
                .into_iter()
                .map(|err| ParserError {
                    file: file.map(str::to_string),
                    start: err.span().start,
                    end: err.span().end,
                    message: err.to_string(),
                })
                .collect(),
        })?;

    Ok(collect_module(name, items))
}

/// Parse a module from textual IR held in memory.
///
/// `name` becomes the module identifier (and the source file name unless the
/// source carries a `source_filename` directive).
pub fn parse_module(name: &str, source: &str) -> Result<Module, Error> {
    parse_with_file(name, source, None)
}

/// Read and parse the module stored at `path`.
///
/// The module identifier is the path as given. Diagnostics carry the path so
/// callers can re-read the file to render source snippets.
pub fn module_from_path(path: &Path) -> Result<Module, Error> {
    let name = path.display().to_string();
    let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: name.clone(),
        source,
    })?;

    let module = parse_with_file(&name, &source, Some(&name))?;
    info!(
        "loaded module `{}` with {} function(s)",
        module.name,
        module.functions.len()
    );
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_type(src: &str) -> Result<Type, Vec<String>> {
        type_parser()
            .then_ignore(end())
            .parse(src)
            .into_result()
            .map_err(|errs| errs.into_iter().map(|e| e.to_string()).collect())
    }

    fn span(range: std::ops::Range<usize>) -> SimpleSpan {
        range.into()
    }

    #[test]
    fn types_round_trip_through_display() {
        for src in [
            "i1",
            "i32",
            "double",
            "ptr",
            "ptr addrspace(3)",
            "void",
            "[4 x i8]",
            "<4 x float>",
            "<vscale x 2 x i64>",
            "{ i32, ptr }",
            "<{ i8, i16 }>",
            "{}",
            "[2 x { i32, [3 x double] }]",
            "%struct.Point",
            "%\"class.std::A\"",
            "i8**",
        ] {
            assert_eq!(parse_type(src).map(|ty| ty.to_string()), Ok(src.to_string()));
        }
    }

    #[test]
    fn rejects_invalid_integer_width() {
        assert!(parse_type("i0").is_err());
        assert!(parse_type("i8388608").is_err());
        assert!(parse_type("int").is_err());
    }

    #[test]
    fn terminators_split_blocks() {
        let lines = vec![
            (Line::Instr(Instruction::new(Opcode::Add)), span(2..5)),
            (Line::Instr(Instruction::new(Opcode::Br)), span(6..9)),
            (Line::Instr(Instruction::new(Opcode::Ret)), span(10..13)),
            (Line::Label("next".into()), span(14..19)),
            (Line::Instr(Instruction::new(Opcode::Unreachable)), span(20..31)),
        ];
        let (blocks, problems) = assemble_blocks(lines, span(0..33));
        assert!(problems.is_empty());
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].label, None);
        assert_eq!(blocks[0].instructions.len(), 2);
        assert_eq!(blocks[1].label, None);
        assert_eq!(blocks[2].label.as_deref(), Some("next"));
    }

    #[test]
    fn unterminated_blocks_are_reported() {
        let lines = vec![
            (Line::Label("entry".into()), span(2..8)),
            (Line::Instr(Instruction::new(Opcode::Add)), span(9..12)),
            (Line::Label("exit".into()), span(13..18)),
        ];
        let (blocks, problems) = assemble_blocks(lines, span(0..20));
        assert_eq!(blocks.len(), 2);
        assert_eq!(problems.len(), 2);
        assert!(problems[0].1.contains("expected a terminator before label `exit`"));
        assert!(problems[1].1.contains("`exit` does not end with a terminator"));
    }

    #[test]
    fn debug_records_are_not_instructions() {
        let lines = vec![
            (Line::DebugRecord, span(2..20)),
            (Line::Instr(Instruction::new(Opcode::Ret)), span(21..24)),
            (Line::DebugRecord, span(25..40)),
        ];
        let (blocks, problems) = assemble_blocks(lines, span(0..42));
        assert!(problems.is_empty());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].instructions.len(), 1);
    }

    #[test]
    fn empty_body_is_reported() {
        let (blocks, problems) = assemble_blocks(Vec::new(), span(0..2));
        assert!(blocks.is_empty());
        assert_eq!(problems.len(), 1);
        assert!(problems[0].1.contains("at least one basic block"));
    }
}
