use crate::flash::{Flash, FlashLevel};
use maud::{Markup, Render, html};

pub fn render_table<const N: usize>(
    overall_title: &'static str,
    titles: [&'static str; N],
    items: Vec<[Markup; N]>,
) -> Markup {
    html! {
        div class="container mx-auto" {
            (title(overall_title))
            div class="overflow-x-auto" {
                table class="min-w-full bg-gray-800 rounded shadow-md" {
                    thead class="bg-gray-700" {
                        tr {
                            @for title in titles {
                                th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                            }
                        }
                    }
                    tbody {
                        @for row in items {
                            tr {
                                @for col in row {
                                    td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn render_nav() -> Markup {
    html! {
        nav class="w-full bg-gray-800 shadow-md px-8 py-4 flex flex-row space-x-4" {
            a href="/" class="font-bold hover:text-blue-400" {"Students"}
            a href="/create/" class="hover:text-blue-400" {"Add Student"}
        }
    }
}

pub fn render_flashes(flashes: &[Flash]) -> Markup {
    html! {
        @for flash in flashes {
            div role="alert" class={"border px-4 py-3 rounded relative " (flash_colours(flash.level))} {
                (flash.message)
            }
        }
    }
}

const fn flash_colours(level: FlashLevel) -> &'static str {
    match level {
        FlashLevel::Success => "bg-green-100 border-green-400 text-green-700",
        FlashLevel::Warning => "bg-yellow-100 border-yellow-400 text-yellow-700",
        FlashLevel::Danger => "bg-red-100 border-red-400 text-red-700",
    }
}

pub fn errors_list(errors: impl Iterator<Item = &'static str>) -> Markup {
    html! {
        div role="alert" class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" {
            ul class="list-disc list-inside" {
                @for error in errors {
                    li {(error)}
                }
            }
        }
    }
}

pub fn simple_form_element(
    id: &'static str,
    label: &'static str,
    required: bool,
    ty: Option<&'static str>,
    value: Option<&str>,
) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            input required[required] id=(id) name=(id) type=(ty.unwrap_or("text")) value=[value] class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";
        }
    }
}

pub fn form_submit_button(label: Option<&str>) -> Markup {
    html! {
        div class="flex items-center justify-between" {
            button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                (label.unwrap_or("Submit"))
            }
        }
    }
}
