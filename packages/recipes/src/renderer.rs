//! The render recipe: reStructuredText for the Sphinx C domain.
//!
//! Rules expect a tree that went through the adjust recipe. Block renderers
//! end their output with a blank line; inline renderers return their span
//! followed by the node's escaped tail.

use aerate_engine::schema::{self, DESCRIPTION_TAGS};
use aerate_engine::{
    AerateError, AerateResult, CrossReferenceIndex, Position, RenderEngine, TargetKind,
};
use aerate_tree::{NodeId, Tree};

use crate::inline::{self, Span, BOLD, EMPHASIS, LITERAL, MATH, SUBSCRIPT, SUPERSCRIPT, UNRESOLVED};
use crate::text::{escape_text, indent, strip_formula_delimiters};

const INDENT: usize = 3;

/// Build the render engine around a cross-reference index
pub fn engine(index: Box<dyn CrossReferenceIndex>) -> AerateResult<RenderEngine> {
    let mut engine =
        RenderEngine::new(index).with_fallback(|tree, node| escape_text(&tree.string_value(node)));

    let rules = [
        RenderEngine::rule("function", render_function)
            .tags(["memberdef"])
            .when_query("@kind='function'")?,
        RenderEngine::rule("typedef", |engine, tree, node, _| {
            let signature = format!("{} {}", field(tree, node, "type")?, field(tree, node, "name")?);
            render_member(engine, tree, node, "c:type", signature.trim())
        })
        .tags(["memberdef"])
        .when_query("@kind='typedef'")?,
        RenderEngine::rule("define", render_define)
            .tags(["memberdef"])
            .when_query("@kind='define'")?,
        RenderEngine::rule("variable", |engine, tree, node, _| {
            let signature = format!("{} {}", field(tree, node, "type")?, field(tree, node, "name")?);
            render_member(engine, tree, node, "c:var", signature.trim())
        })
        .tags(["memberdef"])
        .when_query("@kind='variable'")?,
        RenderEngine::rule("unsupported_member", |_, tree, node, _| {
            let kind = tree.attribute(node, "kind").unwrap_or("");
            Err(AerateError::schema(
                format!("memberdef kind=\"{kind}\""),
                parent_tag(tree, node),
            ))
        })
        .tags(["memberdef"]),
        RenderEngine::rule("description", render_description).tags(DESCRIPTION_TAGS.iter().copied()),
        RenderEngine::rule("return", |engine, tree, node, _| {
            let prefix = ":return: ";
            let body = simplesect_body(engine, tree, node)?;
            Ok(format!("{prefix}{}\n\n", indent(&body, prefix.len()).trim()))
        })
        .tags(["simplesect"])
        .when_query("@kind='return'")?,
        RenderEngine::rule("admonition", |engine, tree, node, _| {
            let kind = tree.attribute(node, "kind").unwrap_or("note");
            directive(&format!(".. {kind}::"), &simplesect_body(engine, tree, node)?)
        })
        .tags(["simplesect"])
        .when(|tree, node| {
            matches!(tree.attribute(node, "kind"), Some("attention" | "note" | "warning"))
        }),
        RenderEngine::rule("remark", |engine, tree, node, _| {
            directive(".. admonition:: Remark", &simplesect_body(engine, tree, node)?)
        })
        .tags(["simplesect"])
        .when_query("@kind='remark'")?,
        RenderEngine::rule("see", |engine, tree, node, _| {
            directive(".. seealso::", &simplesect_body(engine, tree, node)?)
        })
        .tags(["simplesect"])
        .when_query("@kind='see'")?,
        RenderEngine::rule("par", |engine, tree, node, _| {
            let title = field(tree, node, "title")?;
            directive(
                &format!(".. admonition:: {}", title.trim()),
                &simplesect_body(engine, tree, node)?,
            )
        })
        .tags(["simplesect"])
        .when_query("@kind='par'")?,
        RenderEngine::rule("simplesect", |engine, tree, node, _| {
            Ok(format!("{}\n\n", simplesect_body(engine, tree, node)?))
        })
        .tags(["simplesect"]),
        RenderEngine::rule("parameterlist", render_parameterlist).tags(["parameterlist"]),
        RenderEngine::rule("itemizedlist", |engine, tree, node, _| {
            render_list(engine, tree, node, "- ")
        })
        .tags(["itemizedlist"]),
        RenderEngine::rule("orderedlist", |engine, tree, node, _| {
            render_list(engine, tree, node, "#. ")
        })
        .tags(["orderedlist"]),
        RenderEngine::rule("programlisting", render_programlisting).tags(["programlisting"]),
        RenderEngine::rule("external_ref", |_, tree, node, before| {
            Ok(UNRESOLVED.render(&tree.string_value(node), tree.tail(node), before))
        })
        .tags(["ref"])
        .within(["para"])
        .when_query("@external")?,
        RenderEngine::rule("ref", render_ref).tags(["ref"]).within(["para"]),
        RenderEngine::rule("ulink", |_, tree, node, before| {
            let text = escape_text(&tree.string_value(node));
            let url = tree.attribute(node, "url").unwrap_or("");
            let inner = format!("{text} <{url}>");
            Ok(inline::wrap("`", &inner, "`_", tree.tail(node), before))
        })
        .tags(["ulink"]),
        span_rule("bold", BOLD),
        span_rule("emphasis", EMPHASIS),
        span_rule("computeroutput", LITERAL),
        span_rule("subscript", SUBSCRIPT),
        span_rule("superscript", SUPERSCRIPT),
        RenderEngine::rule("display_formula", |_, tree, node, _| {
            let text = tree.text(node).unwrap_or("").trim();
            Ok(format!(
                ".. math::\n{}:nowrap:\n\n{}\n\n{}",
                " ".repeat(INDENT),
                indent(text, INDENT),
                escape_text(tree.tail(node).unwrap_or("").trim_start()),
            ))
        })
        .tags(["formula"])
        .when(schema::is_structural),
        RenderEngine::rule("inline_formula", |_, tree, node, before| {
            let text = strip_formula_delimiters(tree.text(node).unwrap_or(""));
            Ok(MATH.render(&text, tree.tail(node), before))
        })
        .tags(["formula"]),
        RenderEngine::rule("linebreak", |_, tree, node, _| {
            Ok(format!("\n{}", escape_text(tree.tail(node).unwrap_or(""))))
        })
        .tags(["linebreak"]),
        RenderEngine::rule("inline", |_, tree, node, _| {
            Ok(format!(
                "{}{}",
                escape_text(&tree.string_value(node)),
                escape_text(tree.tail(node).unwrap_or(""))
            ))
        })
        .when(schema::is_inline),
        RenderEngine::rule("para", render_para).tags(["para"]),
    ];
    for rule in rules {
        engine.add_rule(rule, Position::Append)?;
    }
    Ok(engine)
}

fn span_rule(tag: &'static str, span: Span) -> aerate_engine::Rule<aerate_engine::RenderAction> {
    RenderEngine::rule(tag, move |_, tree, node, before| {
        Ok(span.render(&tree.string_value(node), tree.tail(node), before))
    })
    .tags([tag])
}

fn parent_tag(tree: &Tree, node: NodeId) -> String {
    tree.parent(node)
        .map(|parent| tree.tag(parent).to_string())
        .unwrap_or_default()
}

fn child(tree: &Tree, node: NodeId, tag: &str) -> Option<NodeId> {
    tree.children(node)
        .iter()
        .copied()
        .find(|&child| tree.tag(child) == tag)
}

/// The string value of a required child
fn field(tree: &Tree, node: NodeId, tag: &str) -> AerateResult<String> {
    child(tree, node, tag)
        .map(|child| tree.string_value(child))
        .ok_or_else(|| AerateError::missing(tag, tree.tag(node)))
}

fn directive(header: &str, body: &str) -> AerateResult<String> {
    Ok(format!("{header}\n\n{}\n\n", indent(body, INDENT)))
}

/// A directive for a member followed by its descriptions
fn render_member(
    engine: &RenderEngine,
    tree: &Tree,
    node: NodeId,
    directive: &str,
    signature: &str,
) -> AerateResult<String> {
    let mut output = format!(".. {directive}:: {signature}\n\n");
    for tag in ["briefdescription", "detaileddescription", "inbodydescription"] {
        let Some(description) = child(tree, node, tag) else {
            continue;
        };
        let rendered = engine.render(tree, description, "")?;
        if rendered.trim().is_empty() {
            continue;
        }
        output.push_str(&indent(rendered.trim_end(), INDENT));
        output.push_str("\n\n");
    }
    Ok(output)
}

fn render_function(
    engine: &RenderEngine,
    tree: &Tree,
    node: NodeId,
    _before: &str,
) -> AerateResult<String> {
    let definition = field(tree, node, "definition")?;
    let arguments = field(tree, node, "argsstring")?;
    render_member(engine, tree, node, "c:function", &format!("{definition}{arguments}"))
}

fn render_define(
    engine: &RenderEngine,
    tree: &Tree,
    node: NodeId,
    _before: &str,
) -> AerateResult<String> {
    let name = field(tree, node, "name")?;
    let params: Vec<String> = tree
        .children(node)
        .iter()
        .filter(|&&child| tree.tag(child) == "param")
        .map(|&param| tree.string_value(param).trim().to_string())
        .collect();
    let signature = if params.is_empty() {
        name
    } else {
        format!("{name}({})", params.join(", "))
    };
    render_member(engine, tree, node, "c:macro", &signature)
}

fn render_description(
    engine: &RenderEngine,
    tree: &Tree,
    node: NodeId,
    _before: &str,
) -> AerateResult<String> {
    let mut paragraphs = Vec::new();
    for &child in tree.children(node) {
        if tree.tag(child) != "para" {
            return Err(AerateError::schema(tree.tag(child), tree.tag(node)));
        }
        let rendered = engine.render(tree, child, "")?;
        let rendered = rendered.trim_end();
        if !rendered.is_empty() {
            paragraphs.push(rendered.to_string());
        }
    }
    Ok(paragraphs.join("\n\n"))
}

fn render_para(
    engine: &RenderEngine,
    tree: &Tree,
    node: NodeId,
    _before: &str,
) -> AerateResult<String> {
    // Source indentation before the first word would start a block quote
    let mut output = escape_text(tree.text(node).unwrap_or("").trim_start());
    for &child in tree.children(node) {
        if schema::is_structural(tree, child) && !output.is_empty() && !output.ends_with('\n') {
            output.push_str("\n\n");
        }
        let rendered = engine.render(tree, child, &output)?;
        output.push_str(&rendered);
    }
    Ok(output)
}

/// The paragraphs of a `simplesect`, separated by blank lines
fn simplesect_body(engine: &RenderEngine, tree: &Tree, node: NodeId) -> AerateResult<String> {
    let mut paragraphs = Vec::new();
    for &child in tree.children(node) {
        match tree.tag(child) {
            "title" => {}
            "para" => {
                let rendered = engine.render(tree, child, "")?;
                if !rendered.trim().is_empty() {
                    paragraphs.push(rendered.trim_end().to_string());
                }
            }
            other => return Err(AerateError::schema(other, tree.tag(node))),
        }
    }
    Ok(paragraphs.join("\n\n"))
}

fn render_parameterlist(
    engine: &RenderEngine,
    tree: &Tree,
    node: NodeId,
    _before: &str,
) -> AerateResult<String> {
    let field_name = match tree.attribute(node, "kind") {
        Some("param") => "param",
        Some("retval") => "retval",
        Some("exception") => "raises",
        kind => {
            return Err(AerateError::schema(
                format!("parameterlist kind=\"{}\"", kind.unwrap_or("")),
                parent_tag(tree, node),
            ));
        }
    };

    let mut lines = Vec::new();
    for &item in tree.children(node) {
        if tree.tag(item) != "parameteritem" {
            return Err(AerateError::schema(tree.tag(item), tree.tag(node)));
        }
        let names = child(tree, item, "parameternamelist")
            .ok_or_else(|| AerateError::missing("parameternamelist", "parameteritem"))?;
        let description = child(tree, item, "parameterdescription")
            .ok_or_else(|| AerateError::missing("parameterdescription", "parameteritem"))?;
        let rendered = engine.render(tree, description, "")?;

        for &name in tree.children(names) {
            if tree.tag(name) != "parametername" {
                continue;
            }
            let prefix = format!(":{field_name} {}: ", tree.string_value(name).trim());
            let body = indent(&rendered, prefix.len());
            lines.push(format!("{prefix}{}", body.trim()).trim_end().to_string());
        }
    }
    Ok(format!("{}\n\n", lines.join("\n")))
}

fn render_list(
    engine: &RenderEngine,
    tree: &Tree,
    node: NodeId,
    bullet: &str,
) -> AerateResult<String> {
    let mut items = Vec::new();
    for &item in tree.children(node) {
        if tree.tag(item) != "listitem" {
            return Err(AerateError::schema(tree.tag(item), tree.tag(node)));
        }
        let mut paragraphs = Vec::new();
        for &child in tree.children(item) {
            if tree.tag(child) != "para" {
                return Err(AerateError::schema(tree.tag(child), tree.tag(item)));
            }
            let rendered = engine.render(tree, child, "")?;
            if !rendered.trim().is_empty() {
                paragraphs.push(rendered.trim_end().to_string());
            }
        }
        let body = indent(&paragraphs.join("\n\n"), bullet.len());
        items.push(format!("{bullet}{}", body.trim_start()));
    }
    Ok(format!("{}\n\n", items.join("\n")))
}

fn render_programlisting(
    _: &RenderEngine,
    tree: &Tree,
    node: NodeId,
    _before: &str,
) -> AerateResult<String> {
    let lines: Vec<String> = tree
        .children(node)
        .iter()
        .filter(|&&line| tree.tag(line) == "codeline")
        .map(|&line| tree.string_value(line))
        .collect();
    Ok(format!(
        ".. code-block:: c\n\n{}\n\n",
        indent(&lines.join("\n"), INDENT)
    ))
}

fn render_ref(
    engine: &RenderEngine,
    tree: &Tree,
    node: NodeId,
    before: &str,
) -> AerateResult<String> {
    let text = tree.string_value(node);
    let tail = tree.tail(node);
    let target = tree
        .attribute(node, "refid")
        .and_then(|refid| engine.index().resolve(refid));

    let Some(target) = target else {
        return Ok(UNRESOLVED.render(&text, tail, before));
    };
    let role = match target.kind {
        TargetKind::Function => "c:func",
        TargetKind::Macro => "c:macro",
        TargetKind::Typedef => "c:type",
        TargetKind::Struct => "c:struct",
        TargetKind::Union => "c:union",
        TargetKind::Enum => "c:enum",
        TargetKind::Enumerator => "c:enumerator",
        TargetKind::Variable => "c:var",
        TargetKind::Other => return Ok(UNRESOLVED.render(&text, tail, before)),
    };

    let same = text == target.name
        || (target.kind == TargetKind::Function && text == format!("{}()", target.name));
    let inner = if same {
        escape_text(&text)
    } else {
        format!("{} <{}>", escape_text(&text), escape_text(&target.name))
    };
    Ok(inline::wrap(&format!(":{role}:`"), &inner, "`", tail, before))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerate_engine::{NullIndex, Target};
    use std::collections::HashMap;

    fn render_with(xml: &str, index: Box<dyn CrossReferenceIndex>) -> AerateResult<String> {
        let tree = Tree::parse(xml).unwrap();
        engine(index)?.render(&tree, tree.root(), "")
    }

    fn render(xml: &str) -> String {
        render_with(xml, Box::new(NullIndex)).unwrap()
    }

    fn index() -> Box<dyn CrossReferenceIndex> {
        let mut map = HashMap::new();
        map.insert("f1".to_string(), Target::new(TargetKind::Function, "open_file"));
        map.insert("m1".to_string(), Target::new(TargetKind::Macro, "MAX_LEN"));
        map.insert("t1".to_string(), Target::new(TargetKind::Typedef, "handle_t"));
        map.insert("s1".to_string(), Target::new(TargetKind::Struct, "point"));
        map.insert("o1".to_string(), Target::new(TargetKind::Other, "file.h"));
        Box::new(map)
    }

    #[test]
    fn test_para_with_spans() {
        assert_eq!(
            render("<para>Use <bold>this</bold>, not <computeroutput>a*b</computeroutput>s.</para>"),
            "Use **this**, not ``a*b``\\s."
        );
    }

    #[test]
    fn test_glued_span_is_escaped() {
        assert_eq!(render("<para>x<bold>test</bold></para>"), "x\\ **test**");
        assert_eq!(render("<para><bold>test</bold></para>"), "**test**");
    }

    #[test]
    fn test_refs() {
        let xml = "<para><ref refid=\"f1\" kindref=\"member\">open_file()</ref> \
                   <ref refid=\"m1\">limit</ref> <ref refid=\"t1\">handle_t</ref> \
                   <ref refid=\"s1\">point</ref> <ref refid=\"o1\">file.h</ref> \
                   <ref refid=\"zz\">gone</ref> <ref refid=\"f1\" external=\"x.tag\">ext</ref></para>";
        assert_eq!(
            render_with(xml, index()).unwrap(),
            ":c:func:`open_file()` :c:macro:`limit <MAX_LEN>` :c:type:`handle_t` \
             :c:struct:`point` `!file.h` `!gone` `!ext`"
        );
    }

    #[test]
    fn test_ref_text_is_escaped() {
        let xml = "<para>a <ref refid=\"zz\">`q`</ref> b <ref refid=\"m1\">x|y</ref></para>";
        assert_eq!(render_with(xml, index()).unwrap(), "a `!\\`q\\`` b :c:macro:`x\\|y <MAX_LEN>`");
    }

    #[test]
    fn test_linebreak() {
        assert_eq!(render("<para>a<linebreak/>b</para>"), "a\nb");
    }

    #[test]
    fn test_ulink_and_roles() {
        assert_eq!(
            render("<para>See <ulink url=\"https://x.org\">site</ulink>, H<subscript>2</subscript>O</para>"),
            "See `site <https://x.org>`_, H\\ :sub:`2`\\O"
        );
    }

    #[test]
    fn test_formulas() {
        assert_eq!(
            render("<para>Area <formula id=\"0\">$\\pi r^2$</formula>.</para>"),
            "Area :math:`\\pi r^2`."
        );
        assert_eq!(
            render("<para><formula id=\"1\">\\[ x \\]</formula></para>"),
            ".. math::\n   :nowrap:\n\n   \\[ x \\]\n\n"
        );
    }

    #[test]
    fn test_description_rejects_non_para() {
        let error = render_with(
            "<detaileddescription><title>x</title></detaileddescription>",
            Box::new(NullIndex),
        )
        .unwrap_err();
        assert_eq!(error.to_string(), "Can't handle <title> inside <detaileddescription>");
    }

    #[test]
    fn test_simplesects() {
        assert_eq!(
            render("<para><simplesect kind=\"return\"><para>Zero on success.</para></simplesect></para>"),
            ":return: Zero on success.\n\n"
        );
        assert_eq!(
            render("<para><simplesect kind=\"note\"><para>One.</para><para>Two.</para></simplesect></para>"),
            ".. note::\n\n   One.\n\n   Two.\n\n"
        );
        assert_eq!(
            render("<para><simplesect kind=\"par\"><title>History</title><para>Old.</para></simplesect></para>"),
            ".. admonition:: History\n\n   Old.\n\n"
        );
        assert_eq!(
            render("<para><simplesect kind=\"see\"><para>Other.</para></simplesect></para>"),
            ".. seealso::\n\n   Other.\n\n"
        );
    }

    #[test]
    fn test_parameterlist() {
        let xml = "<para><parameterlist kind=\"param\">\
                   <parameteritem><parameternamelist><parametername>path</parametername></parameternamelist>\
                   <parameterdescription><para>File to open.</para></parameterdescription></parameteritem>\
                   <parameteritem><parameternamelist><parametername>mode</parametername></parameternamelist>\
                   <parameterdescription><para>Access mode.</para></parameterdescription></parameteritem>\
                   </parameterlist></para>";
        assert_eq!(
            render(xml),
            ":param path: File to open.\n:param mode: Access mode.\n\n"
        );
    }

    #[test]
    fn test_lists() {
        let xml = "<para><itemizedlist><listitem><para>one</para></listitem>\
                   <listitem><para>two</para></listitem></itemizedlist></para>";
        assert_eq!(render(xml), "- one\n- two\n\n");
        let xml = "<para><orderedlist><listitem><para>one</para></listitem></orderedlist></para>";
        assert_eq!(render(xml), "#. one\n\n");
    }

    #[test]
    fn test_programlisting() {
        let xml = "<para><programlisting><codeline><highlight class=\"normal\">int x;</highlight></codeline>\
                   <codeline><highlight class=\"normal\">return x;</highlight></codeline></programlisting></para>";
        assert_eq!(
            render(xml),
            ".. code-block:: c\n\n   int x;\n   return x;\n\n"
        );
    }

    #[test]
    fn test_blank_paragraphs_are_skipped() {
        let xml = "<para><simplesect kind=\"note\"><para>One.</para><para>\n   </para></simplesect></para>";
        assert_eq!(render(xml), ".. note::\n\n   One.\n\n");
        let xml = "<para><itemizedlist><listitem><para>one</para><para> </para></listitem></itemizedlist></para>";
        assert_eq!(render(xml), "- one\n\n");
    }

    #[test]
    fn test_paragraph_indentation_is_dropped() {
        assert_eq!(render("<para>\n      Indented <bold>text</bold>.\n   </para>"), "Indented **text**.\n   ");
    }

    #[test]
    fn test_unsupported_member_kind() {
        let error = render_with("<memberdef kind=\"friend\"/>", Box::new(NullIndex)).unwrap_err();
        assert!(matches!(error, AerateError::Schema { .. }));
    }
}
