//! The adjust recipe: canonicalizes a Doxygen description tree into the
//! shapes the renderer understands.
//!
//! After a run, inline markup is flat and trimmed, `simplesect`s of the same
//! kind are merged, and every `para` holds either inline content or block
//! content but not both.

use aerate_engine::schema::{self, MarkupClass, INLINE_TAGS, PRESENTATION_TAGS};
use aerate_engine::{AerateError, AerateResult, MutationCursor, MutationEngine, Position};
use aerate_tree::{NodeId, Tree};

use crate::text::split_whitespace;

/// Build the adjust engine
pub fn engine() -> AerateResult<MutationEngine> {
    let mut engine = MutationEngine::new();
    let rules = [
        MutationEngine::rule("textualize_highlight_ref", |_, cursor| {
            let node = current(cursor)?;
            let text = cursor.tree().string_value(node);
            textualize(cursor, node, &text)
        })
        .tags(["ref"])
        .within(["highlight"]),
        MutationEngine::rule("textualize_highlight_sp", |_, cursor| {
            let node = current(cursor)?;
            textualize(cursor, node, " ")
        })
        .tags(["sp"])
        .within(["highlight"]),
        MutationEngine::rule("textualize_linebreak", |_, cursor| {
            let node = current(cursor)?;
            textualize(cursor, node, "\n")
        })
        .tags(["linebreak"]),
        MutationEngine::rule("remove_presentation_inline", remove_current)
            .tags(PRESENTATION_TAGS.iter().copied()),
        MutationEngine::rule("remove_empty_inline", remove_current)
            .tags(INLINE_TAGS.iter().copied())
            .when(|tree, node| schema::is_inline(tree, node) && schema::is_empty(tree, node)),
        MutationEngine::rule("flatten_link", flatten_link)
            .tags(["ulink"])
            .when_query("./*")?,
        MutationEngine::rule("lift_nested_inline", lift_nested_inline)
            .tags(INLINE_TAGS.iter().copied())
            .when_query("./*")?,
        MutationEngine::rule("trim_inline", trim_inline)
            .tags(INLINE_TAGS.iter().copied())
            .when(has_surrounding_whitespace),
        MutationEngine::rule("remove_empty_simplesect", remove_current)
            .tags(["simplesect"])
            .when(schema::is_empty),
        MutationEngine::rule("absorb_compatible_simplesect", absorb_compatible_simplesect)
            .tags(["simplesect"])
            .when_query("preceding-sibling::*[1][self::simplesect]")?,
        MutationEngine::rule("remove_empty_para", remove_current)
            .tags(["para"])
            .when(schema::is_empty),
        MutationEngine::rule("divide_para", divide_para).tags(["para"]),
    ];
    for rule in rules {
        engine.add_rule(rule, Position::Append)?;
    }
    Ok(engine)
}

/// Run the adjust recipe over `root`
pub fn adjust(tree: &mut Tree, root: NodeId) -> AerateResult<()> {
    engine()?.run(tree, root)
}

fn current(cursor: &MutationCursor<'_>) -> AerateResult<NodeId> {
    cursor
        .node()
        .ok_or_else(|| AerateError::contract("adjust", "", "the cursor is exhausted"))
}

/// Remove the current node. A parent left empty is visited again so it can
/// be removed in turn.
fn remove_current(_: &MutationEngine, cursor: &mut MutationCursor<'_>) -> AerateResult<()> {
    let node = current(cursor)?;
    let parent = cursor.tree().parent(node);
    cursor.remove(None)?;
    if let Some(parent) = parent {
        if parent != cursor.root()
            && cursor.contains(parent)
            && schema::is_empty(cursor.tree(), parent)
        {
            cursor.move_to(parent)?;
        }
    }
    Ok(())
}

/// Append `text` to whatever precedes `node`, then drop `node`
fn textualize(cursor: &mut MutationCursor<'_>, node: NodeId, text: &str) -> AerateResult<()> {
    let tree = cursor.tree_mut();
    match (tree.previous_sibling(node), tree.parent(node)) {
        (Some(previous), _) => tree.extend_tail(previous, text),
        (None, Some(parent)) => tree.extend_text(parent, text),
        (None, None) => {}
    }
    cursor.remove(Some(node))
}

fn lift_nested_inline(_: &MutationEngine, cursor: &mut MutationCursor<'_>) -> AerateResult<()> {
    let node = current(cursor)?;
    let tree = cursor.tree();
    let Some(child) = tree.first_child(node) else {
        cursor.advance_into();
        return Ok(());
    };
    if !schema::is_inline(tree, child) {
        return Err(AerateError::schema(tree.tag(child), tree.tag(node)));
    }
    cursor.lift(Some(child))
}

/// Replace markup nested in a link with its text so the link keeps its
/// content and its URL
fn flatten_link(_: &MutationEngine, cursor: &mut MutationCursor<'_>) -> AerateResult<()> {
    let node = current(cursor)?;
    let tree = cursor.tree_mut();
    let children = tree.children(node).to_vec();
    if let Some(&block) = children.iter().find(|&&child| !schema::is_inline(tree, child)) {
        return Err(AerateError::schema(tree.tag(block), tree.tag(node)));
    }
    let text = tree.string_value(node);
    for child in children {
        tree.detach(child)?;
    }
    tree.set_text(node, Some(text));
    Ok(())
}

fn has_surrounding_whitespace(tree: &Tree, node: NodeId) -> bool {
    schema::is_inline(tree, node)
        && tree.text(node).is_some_and(|text| {
            text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
        })
}

/// Move leading and trailing whitespace out of an inline node's text and
/// into the surrounding text flow. The cursor stays on the node.
fn trim_inline(_: &MutationEngine, cursor: &mut MutationCursor<'_>) -> AerateResult<()> {
    let node = current(cursor)?;
    let tree = cursor.tree_mut();
    let Some(text) = tree.take_text(node) else {
        return Ok(());
    };
    let (head, body, tail) = split_whitespace(&text);

    match (tree.previous_sibling(node), tree.parent(node)) {
        (Some(previous), _) => tree.extend_tail(previous, head),
        (None, Some(parent)) => tree.extend_text(parent, head),
        (None, None) => {}
    }
    tree.prepend_tail(node, tail);
    if !body.is_empty() {
        tree.set_text(node, Some(body.to_string()));
    }
    Ok(())
}

fn absorb_compatible_simplesect(
    _: &MutationEngine,
    cursor: &mut MutationCursor<'_>,
) -> AerateResult<()> {
    let node = current(cursor)?;
    let tree = cursor.tree();
    let compatible = tree.previous_sibling(node).is_some_and(|previous| {
        tree.tag(previous) == tree.tag(node)
            && tree.attributes(previous) == tree.attributes(node)
            && tree.namespaces(previous) == tree.namespaces(node)
    });
    if compatible {
        cursor.merge_into_previous(None)
    } else {
        cursor.advance_into();
        Ok(())
    }
}

/// Split a `para` where its content switches between inline and block
/// markup. The cursor stays on the para after a split so the shortened
/// para is examined again.
fn divide_para(_: &MutationEngine, cursor: &mut MutationCursor<'_>) -> AerateResult<()> {
    let node = current(cursor)?;
    let tree = cursor.tree();

    let children = tree.children(node).to_vec();
    let simple = match children.first() {
        None => true,
        Some(_) if tree.has_text(node) => true,
        Some(&first) => match schema::classify(tree, first) {
            MarkupClass::Inline => true,
            MarkupClass::Structural => false,
            MarkupClass::Other => {
                return Err(AerateError::schema(tree.tag(first), tree.tag(node)));
            }
        },
    };

    for child in children {
        let tree = cursor.tree();
        match (simple, schema::classify(tree, child)) {
            (_, MarkupClass::Other) => {
                return Err(AerateError::schema(tree.tag(child), tree.tag(node)));
            }
            (true, MarkupClass::Structural) | (false, MarkupClass::Inline) => {
                return cursor.split_before(Some(child));
            }
            (false, MarkupClass::Structural) if tree.has_tail(child) => {
                return cursor.split_after_tail(Some(child));
            }
            _ => {}
        }
    }

    cursor.advance_into();
    Ok(())
}
