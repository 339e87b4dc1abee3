/// Build the cleaning instructions for one chunk. Position and total only
/// give the service context; they do not affect how results are combined.
pub fn build_prompt(chunk: &str, position: usize, total: usize) -> String {
    format!(
        "You are formatting chunk {position} of {total} from a larger text file.
Please follow these formatting instructions:

1. Remove any irrelevant information such as page numbers, headers, footers, and formatting artifacts.
    - If a short chapter-like blurb appears inside or between unrelated sentences, treat it as a running chapter title and remove it.
    - Remove stray numbers inside or between sentences that do not make sense there. These are likely page numbers.
2. Keep the words exactly the same except for formatting fixes and misspellings.
    - Never write commentary such as \"Here is the cleaned text for chunk {position} of {total}:\".
3. Make sure the output is clean and well formatted.
4. If the text describes tables, charts, or images, preserve that information in a clear textual form.
5. Keep the context and flow of the text, considering that this is part of a larger document.
6. Process and return the ENTIRE chunk.

Here is the text chunk to clean:

{chunk}

Provide ONLY the cleaned text content without any additional commentary or confirmation:"
    )
}
