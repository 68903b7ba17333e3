//! Type string parsing utilities.
//!
//! Resource and event types arrive as display strings
//! (`0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>`). Matching goes through
//! a parsed [`StructTag`] so address padding never matters, while the raw text
//! of type arguments is kept verbatim for callers that need the exact spelling.

use move_core_types::identifier::Identifier;
use move_core_types::language_storage::{StructTag, TypeTag};

use crate::address::{normalize_address, Address};

/// Parse a Move type string into a TypeTag.
///
/// Supports:
/// - Primitive types: `bool`, `u8`, `u16`, `u32`, `u64`, `u128`, `u256`, `address`, `signer`
/// - Vector types: `vector<T>`
/// - Struct types: `0x1::module::Struct` or `0x1::module::Struct<T1, T2>`
///
/// # Examples
///
/// ```
/// use vault_sim_types::type_parsing::parse_type_tag;
///
/// let tag = parse_type_tag("0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>").unwrap();
/// assert!(matches!(tag, move_core_types::language_storage::TypeTag::Struct(_)));
/// ```
pub fn parse_type_tag(type_str: &str) -> Option<TypeTag> {
    let type_str = type_str.trim();

    match type_str {
        "bool" => return Some(TypeTag::Bool),
        "u8" => return Some(TypeTag::U8),
        "u16" => return Some(TypeTag::U16),
        "u32" => return Some(TypeTag::U32),
        "u64" => return Some(TypeTag::U64),
        "u128" => return Some(TypeTag::U128),
        "u256" => return Some(TypeTag::U256),
        "address" => return Some(TypeTag::Address),
        "signer" => return Some(TypeTag::Signer),
        _ => {}
    }

    if let Some(inner) = type_str
        .strip_prefix("vector<")
        .and_then(|s| s.strip_suffix('>'))
    {
        let inner_tag = parse_type_tag(inner)?;
        return Some(TypeTag::Vector(Box::new(inner_tag)));
    }

    parse_struct_tag(type_str).map(|tag| TypeTag::Struct(Box::new(tag)))
}

/// Parse a struct type string (`<address>::<module>::<name><type_args>`).
pub fn parse_struct_tag(type_str: &str) -> Option<StructTag> {
    let type_str = type_str.trim();
    let (base_type, type_args_str) = match type_str.find('<') {
        Some(angle_pos) => (&type_str[..angle_pos], Some(&type_str[angle_pos..])),
        None => (type_str, None),
    };

    let parts: Vec<&str> = base_type.split("::").collect();
    if parts.len() != 3 {
        return None;
    }

    let address = normalize_address(parts[0]).ok()?.account_address();
    let module = Identifier::new(parts[1].trim()).ok()?;
    let name = Identifier::new(parts[2].trim()).ok()?;

    let type_params = match type_args_str {
        Some(args_str) => parse_type_args(args_str)?,
        None => vec![],
    };

    Some(StructTag {
        address,
        module,
        name,
        type_params,
    })
}

/// Parse type arguments string like "<T1, T2, T3>".
fn parse_type_args(args_str: &str) -> Option<Vec<TypeTag>> {
    let inner = args_str.strip_prefix('<')?.strip_suffix('>')?;
    split_type_params(inner)
        .into_iter()
        .map(parse_type_tag)
        .collect()
}

/// Split type parameters respecting nested angle brackets.
///
/// Given "A, B<C, D>, E", returns ["A", "B<C, D>", "E"] by tracking bracket depth.
pub fn split_type_params(s: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut depth = 0;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                result.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    let last = s[start..].trim();
    if !last.is_empty() {
        result.push(last);
    }

    result
}

/// The verbatim text of a type's outer type arguments.
///
/// `"0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>"` yields
/// `["0x1::aptos_coin::AptosCoin"]`. Returns `None` when the type is not generic.
pub fn generic_type_args(type_str: &str) -> Option<Vec<&str>> {
    let type_str = type_str.trim();
    let open = type_str.find('<')?;
    let inner = type_str.strip_suffix('>')?.get(open + 1..)?;
    Some(split_type_params(inner))
}

/// Whether `tag` is the struct `address::module::name`, ignoring type arguments.
pub fn is_struct(tag: &StructTag, address: &Address, (module, name): (&str, &str)) -> bool {
    tag.address == address.account_address()
        && tag.module.as_str() == module
        && tag.name.as_str() == name
}
